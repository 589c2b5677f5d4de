// Example: Basic param compilation
// Run with: cargo run --example basic_usage

use paramql::{sql, ConditionBuilder, Dialect, Operator, ParamValue};

fn main() -> anyhow::Result<()> {
    println!("=== ParamQL Basic Usage Example ===\n");

    // Create a builder targeting MySQL
    let builder = ConditionBuilder::new(Dialect::mysql());

    // 1. A single value is a plain equality
    println!("1. Single value...");
    let condition = builder.parse_param("status", "active")?;
    println!("   {}\n", sql::to_where_sql(&condition));

    // 2. Comma-joined values collapse to IN
    println!("2. Comma-joined list...");
    let condition = builder.parse_param("status", "active,pending")?;
    println!("   {}\n", sql::to_where_sql(&condition));

    // 3. A leading glue word and operator prefixes
    println!("3. AND glue with inequalities (NOT IN)...");
    let condition = builder.parse_param("id", vec!["and", "!=1", "!=2"])?;
    println!("   {}\n", sql::to_where_sql(&condition));

    // 4. NOT glue negates every operator
    println!("4. NOT glue...");
    let condition = builder.parse_param("age", vec!["not", "<21"])?;
    println!("   {}\n", sql::to_where_sql(&condition));

    // 5. Wildcards become LIKE patterns
    println!("5. Wildcards...");
    let condition = builder.parse_param("title", "*rust*")?;
    println!("   {}\n", sql::to_where_sql(&condition));

    // 6. Null input matches empty columns
    println!("6. Null param...");
    let condition = builder.parse_param("email", ParamValue::Null)?;
    println!("   {}\n", sql::to_where_sql(&condition));

    // 7. Numeric columns validate their values
    println!("7. Numeric validation...");
    let condition = builder.parse_numeric("price", ">=9.99", Operator::Eq)?;
    println!("   {}", sql::to_where_sql(&condition));
    match builder.parse_numeric("price", "cheap", Operator::Eq) {
        Ok(_) => println!("   unexpected success"),
        Err(e) => println!("   'cheap' is rejected: {}\n", e),
    }

    // 8. The query-builder JSON form
    println!("8. Query-builder form...");
    let condition = builder.parse_param("status", "active,pending")?;
    println!("   {}", serde_json::to_string(&condition.to_param())?);

    Ok(())
}
