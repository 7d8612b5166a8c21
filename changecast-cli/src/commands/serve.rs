use anyhow::Result;
use changecast_server::ChangelogServer;
use colored::Colorize;
use std::net::SocketAddr;

pub async fn run(port: u16) -> Result<()> {
    println!("{}", "🚀 Starting changelog server...".bold().cyan());
    println!(
        "   {}: {}",
        "Publish endpoint".bold(),
        format!("http://localhost:{}/changelogs", port).green()
    );
    println!();
    println!("{}", "Press Ctrl+C to stop".dimmed());
    println!();

    let addr: SocketAddr = format!("127.0.0.1:{}", port).parse()?;
    ChangelogServer::new().serve(addr).await?;

    Ok(())
}
