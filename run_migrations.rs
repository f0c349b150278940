use sqlx::postgres::PgPool;
use sqlx::Row;
use std::env;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    let database_url = env::var("DATABASE_URL")
        .map_err(|_| "DATABASE_URL must be set to run migrations")?;

    println!("🔗 Connecting to database...");
    let pool = match PgPool::connect(&database_url).await {
        Ok(pool) => pool,
        Err(e) => {
            println!("❌ Database connection failed: {}", e);
            println!("💡 Check the host, port and credentials in DATABASE_URL");
            return Err(e.into());
        }
    };

    let row = sqlx::query("SELECT current_database() AS db, current_user AS usr")
        .fetch_one(&pool)
        .await?;
    let db: String = row.get("db");
    let user: String = row.get("usr");
    println!("✅ Connected to '{}' as '{}'", db, user);

    println!("\n🧪 Running migrations...");
    sqlx::migrate!("./migrations").run(&pool).await?;

    let tables: i64 = sqlx::query(
        r#"
        SELECT count(*) FROM information_schema.tables
        WHERE table_schema = 'public'
          AND table_name IN ('users', 'conversations', 'direct_messages',
                             'group_chats', 'group_members', 'group_messages')
        "#,
    )
    .fetch_one(&pool)
    .await?
    .get(0);

    println!("✅ Migrations applied ({} of 6 chat tables present)", tables);

    Ok(())
}
