use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    blog_api::app::run().await
}
