use anyhow::{bail, Context};
use gradebook::{config::Config, db::init_db, report, seed, Repository};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let config = Config::from_env().context("Configuration error")?;

    let pool = init_db(&config.database_path)
        .await
        .with_context(|| format!("Failed to initialize database at {}", config.database_path))?;
    let repo = Repository::new(pool);
    repo.ping().await.context("Database is not reachable")?;

    if config.seed {
        let summary = seed::load_source(&repo, config.seed_dir.as_deref())
            .await
            .context("Seed load failed")?;
        tracing::info!(
            students_inserted = summary.students_inserted,
            grades_inserted = summary.grades_inserted,
            "Seed data ready"
        );
    }

    let integrity = repo.check_integrity().await?;
    if !integrity.is_clean() {
        bail!(
            "Stored data violates invariants: {} orphan grades, {} out-of-range scores",
            integrity.orphan_grades,
            integrity.out_of_range_scores
        );
    }

    let params = report::ReportParams::from(&config);
    let reports = report::run_reports(&repo, &params).await?;
    println!("{}", reports.render(config.report_format)?);

    Ok(())
}
