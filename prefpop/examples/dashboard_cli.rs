use prefpop::dashboard::{CycleOutcome, Dashboard};
use prefpop::io::table_export::write_table_csv;
use prefpop::{Category, ResasClient, ResasConfig};
use tracing_subscriber::EnvFilter;

// Usage: RESAS_API_KEY=... dashboard_cli <category> <prefCode> [prefCode ...]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .try_init();

    let mut args = std::env::args().skip(1);
    let category: Category = args
        .next()
        .unwrap_or_else(|| "total".to_string())
        .parse()
        .map_err(anyhow::Error::msg)?;
    let codes: Vec<u32> = args.map(|a| a.parse()).collect::<Result<_, _>>()?;

    let client = ResasClient::new(&ResasConfig::from_env()?)?;
    let dashboard = Dashboard::new(client);
    dashboard.load_prefectures().await?;

    let mut last = CycleOutcome::Applied;
    for code in codes {
        last = dashboard.toggle_prefecture(code).await?;
    }
    anyhow::ensure!(last == CycleOutcome::Applied, "last cycle was superseded");

    dashboard.set_category(category).await;
    let view = dashboard.view().await;
    write_table_csv(std::io::stdout().lock(), &view.rows, view.selection.codes())?;
    for ds in &view.chart.datasets {
        println!("# {} {} ({} points)", ds.label, ds.color, ds.points.len());
    }
    Ok(())
}
