use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use time::{Duration, OffsetDateTime, Time};

use fintrack::{
    PasswordHash, Transaction, ValidatedPassword, create_transaction, create_user, initialize_db,
};

/// A utility for creating a test database for the REST API server of fintrack.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

// IDs of seeded default categories.
const SALARY: i64 = 1;
const FREELANCE: i64 = 3;
const HOUSING: i64 = 6;
const TRANSPORTATION: i64 = 7;
const FOOD: i64 = 8;
const UTILITIES: i64 = 9;
const SHOPPING: i64 = 11;

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        None => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        _ => {}
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    println!("Creating test user...");

    let password_hash = PasswordHash::new(
        ValidatedPassword::new_unchecked("password123"),
        PasswordHash::DEFAULT_COST,
    )?;
    let user = create_user("Demo User", "demo@example.com", &password_hash, &conn)?;

    println!("Creating transactions for the last six months...");

    let mut month_start = OffsetDateTime::now_utc()
        .replace_day(1)?
        .replace_time(Time::MIDNIGHT);
    let mut count = 0;

    for months_ago in 0..6 {
        if months_ago > 0 {
            month_start = (month_start - Duration::days(1)).replace_day(1)?;
        }

        let recurring = [
            (SALARY, 4200.0, 0, "Monthly salary"),
            (HOUSING, 1450.0, 1, "Rent"),
            (UTILITIES, 120.0 + 10.0 * months_ago as f64, 4, "Power and internet"),
        ];
        let one_off = [
            (FOOD, 85.4 + 3.0 * months_ago as f64, 3, "Groceries"),
            (FOOD, 23.5, 9, "Dinner out"),
            (TRANSPORTATION, 60.0, 12, "Fuel"),
            (SHOPPING, 149.99 - 10.0 * months_ago as f64, 18, "New shoes"),
            (FREELANCE, 650.0, 20, "Website project"),
        ];

        for (category_id, amount, day_offset, description) in recurring {
            let date = month_start + Duration::days(day_offset);
            create_transaction(
                Transaction::build(user.id, category_id, amount, date, description).recurring(true),
                &conn,
            )?;
            count += 1;
        }

        for (category_id, amount, day_offset, description) in one_off {
            let date = month_start + Duration::days(day_offset);
            create_transaction(
                Transaction::build(user.id, category_id, amount, date, description),
                &conn,
            )?;
            count += 1;
        }
    }

    println!("Created {count} transactions.");
    println!("Log in with demo@example.com / password123");
    println!("Success!");

    Ok(())
}
