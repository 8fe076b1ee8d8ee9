// Utility to generate the administrator password hash for `admin.password_hash`

use std::{env, process};

use fake::faker::internet::en::Password;
use fake::Fake;
use secrecy::{ExposeSecret, SecretString};

use madmimi_optin::authentication::compute_password_hash;

fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let args: Vec<String> = env::args().collect();
    if args.iter().skip(1).any(|arg| arg.starts_with('-')) {
        usage(&args[0]);
    }

    // Hash the given password, or a random one that is printed as well
    let password = match args.len() {
        1 => {
            let password: String = Password(32..33).fake();
            println!("Password: {password}");
            password
        }
        2 => args[1].clone(),
        _ => usage(&args[0]),
    };

    let password_hash = compute_password_hash(&SecretString::from(password))?;
    println!("PhcString: {}", password_hash.expose_secret());

    Ok(())
}

/// Print usage information and exit
fn usage(prog: &str) -> ! {
    println!("Usage:");
    println!("{prog} [password]");
    println!("\nExamples:");
    println!("{prog}");
    println!("{prog} everythinghastostartsomewhere");

    process::exit(1);
}
