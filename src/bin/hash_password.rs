//! Prints an argon2 PHC string for `APP__ADMIN_PASSWORD_HASH`.

use std::io::{self, BufRead};

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "hash-password", about = "Hash the staff password for configuration")]
struct Args {
    /// Password to hash; read from stdin when omitted
    password: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let password = match args.password {
        Some(p) => p,
        None => {
            let mut line = String::new();
            io::stdin().lock().read_line(&mut line)?;
            line.trim_end_matches(['\r', '\n']).to_string()
        }
    };

    if password.is_empty() {
        anyhow::bail!("password must not be empty");
    }

    let hash = bakehouse_api::auth::hash_password(&password)?;
    println!("{}", hash);
    Ok(())
}
