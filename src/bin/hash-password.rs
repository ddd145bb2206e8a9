use bcrypt::{DEFAULT_COST, hash};

/// Produces a bcrypt hash for the credential seed file:
///
/// ```text
/// cargo run --bin hash-password -- <password>
/// ```
fn main() {
    let password = match std::env::args().nth(1) {
        Some(p) => p,
        None => {
            eprintln!("usage: hash-password <password>");
            std::process::exit(2);
        }
    };

    match hash(&password, DEFAULT_COST) {
        Ok(hashed) => println!("{hashed}"),
        Err(e) => {
            eprintln!("failed to hash password: {e}");
            std::process::exit(1);
        }
    }
}
