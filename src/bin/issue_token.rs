use fifa_server_http_api::jwt::{Keys, generate_jwt};

const DEFAULT_VALID_HOURS: i64 = 12;

fn main() {
    dotenvy::dotenv().ok();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 || args.len() > 4 {
        eprintln!("Usage: issue_token <subject> [username] [valid_hours]");
        std::process::exit(1);
    }

    let secret = std::env::var("FIFA_JWT_SECRET").expect("FIFA_JWT_SECRET env var not set");
    let subject = match args[1].parse::<i64>() {
        Ok(id) => serde_json::Value::from(id),
        Err(_) => serde_json::Value::from(args[1].clone()),
    };
    let username = args.get(2).cloned();
    let hours = args
        .get(3)
        .map(|h| h.parse::<i64>().expect("valid_hours must be an integer"))
        .unwrap_or(DEFAULT_VALID_HOURS);

    let token = generate_jwt(
        &Keys::new(secret.as_bytes()),
        subject,
        username,
        chrono::Duration::hours(hours),
    )
    .expect("Failed to sign token");
    println!("{}", token);
}
