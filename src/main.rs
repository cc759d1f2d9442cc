#[tokio::main]
async fn main() {
    fishburger_backend::run().await
}
