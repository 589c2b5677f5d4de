// Example: Dialect differences and date params
// Run with: cargo run --example where_clauses

use chrono::FixedOffset;
use paramql::{sql, ColumnType, ConditionBuilder, Dialect, Operator, ParamValue};

fn main() -> anyhow::Result<()> {
    println!("=== ParamQL Dialect and Date Example ===\n");

    let mysql = ConditionBuilder::new(Dialect::mysql());
    let postgres = ConditionBuilder::new(Dialect::postgres());

    // 1. The two backends disagree on what "empty" means
    println!("1. Null param on an untyped column...");
    let condition = mysql.parse_param("email", ParamValue::Null)?;
    println!("   mysql:    {}", sql::to_where_sql(&condition));
    let condition = postgres.parse_param("email", ParamValue::Null)?;
    println!("   postgres: {}\n", sql::to_where_sql(&condition));

    // 2. A textual column widens the empty marker on both
    println!("2. Empty marker on a textual column...");
    let condition = postgres.parse(
        "email",
        ":empty:",
        Operator::Eq,
        false,
        Some(ColumnType::Textual),
    )?;
    println!("   {}\n", sql::to_where_sql(&condition));

    // 3. Case-insensitive matching picks ILIKE where it exists
    println!("3. Case-insensitive wildcard...");
    let condition = postgres.parse("title", "*Rust*", Operator::Eq, true, None)?;
    println!("   postgres: {}", sql::to_where_sql(&condition));
    let condition = mysql.parse("title", "*Rust*", Operator::Eq, true, None)?;
    println!("   mysql:    {}\n", sql::to_where_sql(&condition));

    // 4. Date params normalize to UTC storage strings
    println!("4. Date range in a +02:00 reference timezone...");
    let tz = FixedOffset::east_opt(2 * 3600).expect("valid offset");
    let condition = postgres.parse_date(
        "posted_at",
        vec!["and", ">=2023-01-01", "<2024-01-01"],
        Operator::Eq,
        tz,
    )?;
    println!("   {}\n", sql::to_where_sql(&condition));

    // 5. Every rendered fragment parses back as real SQL
    println!("5. Validating rendered fragments...");
    sql::validate(&condition)?;
    println!("   ok");

    Ok(())
}
