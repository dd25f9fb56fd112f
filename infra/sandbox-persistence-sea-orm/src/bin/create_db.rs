use sandbox_persistence_sea_orm::{create_db_pool, database_url_from_env, schema::create_schema};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let db_url = match database_url_from_env() {
        Ok(url) => url,
        Err(missing) => panic!("{} must be set", missing),
    };
    let pool = create_db_pool(&db_url).await;

    create_schema(&pool)
        .await
        .expect("Failed to create tables");

    println!("Database tables created successfully.");
}
