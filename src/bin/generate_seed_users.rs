// Utility to generate seed users to populate the `users` table

use std::{env, process};

use fake::faker::internet::en::{Password, Username};
use fake::Fake;
use secrecy::{ExposeSecret, SecretBox};
use uuid::Uuid;

use gatehouse::authentication::compute_password_hash;

/// Seed user
#[derive(Debug)]
pub struct SeedUser {
    pub user_id: Uuid,
    pub username: String,
    pub password: String,
}

impl SeedUser {
    /// Generate new random seed user
    pub fn generate() -> Self {
        Self {
            user_id: Uuid::new_v4(),
            username: Username().fake(),
            password: Password(32..33).fake(),
        }
    }

    /// Return an SQL statement inserting this user, with the password stored as a PHC string
    pub fn insert_statement(&self) -> anyhow::Result<String> {
        let password = SecretBox::new(Box::new(self.password.clone()));
        let password_hash = compute_password_hash(&password)?;
        Ok(format!(
            "INSERT INTO users (user_id, username, password_hash) VALUES ('{}', '{}', '{}');",
            self.user_id,
            self.username.replace('\'', "''"),
            password_hash.expose_secret()
        ))
    }

    /// Print the credentials as an SQL comment, followed by the insert statement
    fn print(&self) -> anyhow::Result<()> {
        println!("-- username: {} password: {}", self.username, self.password);
        println!("{}", self.insert_statement()?);
        Ok(())
    }
}

/// Generate example seed users
fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let args: Vec<String> = env::args().collect();
    if args.iter().skip(1).any(|arg| arg.starts_with('-')) {
        usage(&args[0]);
    }

    // Decide the course of action based on the number of arguments
    match args.len() {
        // Generate 10 sample seed users with random username and password
        1 => {
            for _ in 0..10 {
                SeedUser::generate().print()?;
            }
        }

        // Generate a sample seed user with the specified username and a random password
        2 => {
            let mut seeduser = SeedUser::generate();
            seeduser.username.clone_from(&args[1]);
            seeduser.print()?;
        }

        // Generate a sample seed user with the specified username and password
        3 => {
            let mut seeduser = SeedUser::generate();
            seeduser.username.clone_from(&args[1]);
            seeduser.password.clone_from(&args[2]);
            seeduser.print()?;
        }

        // Print usage and exit
        _ => usage(&args[0]),
    }

    Ok(())
}

/// Print usage information and exit
fn usage(prog: &str) -> ! {
    println!("Usage:");
    println!("{prog} [username] [password]");
    println!("\nExamples:");
    println!("{prog}");
    println!("{prog} admin everythinghastostartsomewhere");
    println!("{prog} | psql gatehouse");

    process::exit(1);
}
