#[tokio::main]
async fn main() -> anyhow::Result<()> {
    resume_tailor_lib::run().await
}
