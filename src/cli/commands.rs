use crate::app::{AppContext, NewsError, Result};
use crate::config::Config;
use crate::domain::{FilterSet, NewsResponse, UserId};
use crate::scheduler::{RefreshScheduler, SchedulerConfig, PROBE_COUNTRY};

pub async fn headlines(
    ctx: &AppContext,
    categories: Option<&str>,
    sources: Option<&str>,
    countries: Option<&str>,
    languages: Option<&str>,
) -> Result<()> {
    let filter = FilterSet::new()
        .with_categories(split_tokens(categories))
        .with_sources(split_tokens(sources))
        .with_countries(split_tokens(countries))
        .with_languages(split_tokens(languages));

    let response = ctx.engine.top_headlines(&filter).await?;
    print_articles(&response);
    Ok(())
}

pub async fn search(ctx: &AppContext, keyword: &str, sources: Option<&str>) -> Result<()> {
    let filter = FilterSet::new().with_sources(split_tokens(sources));
    let response = ctx.engine.search(keyword, &filter).await?;
    print_articles(&response);
    Ok(())
}

pub async fn sources(ctx: &AppContext) -> Result<()> {
    let response = ctx.engine.all_sources().await?;
    println!("Provider status: {}", response.status);
    if !response.articles.is_empty() {
        print_articles(&response);
    }
    Ok(())
}

pub async fn feed(ctx: &AppContext, user: &str) -> Result<()> {
    let user = UserId::from(user);

    if ctx.prefs.resolve(&user).await.is_none() {
        println!("No preferences for {}; showing default headlines", user);
    }

    let response = ctx.engine.news_for_user(&user).await?;
    print_articles(&response);
    Ok(())
}

pub async fn check(ctx: &AppContext) -> Result<()> {
    let filter = FilterSet::new().with_countries([PROBE_COUNTRY]);
    let response = ctx.engine.top_headlines(&filter).await?;
    println!(
        "Upstream reachable ({} headlines for {})",
        response.articles.len(),
        PROBE_COUNTRY
    );
    Ok(())
}

pub async fn run(
    ctx: &AppContext,
    config: &Config,
    warm_interval: Option<&str>,
    probe_interval: Option<&str>,
    no_initial_refresh: bool,
) -> Result<()> {
    let mut scheduler_config = config.scheduler.clone();
    scheduler_config.warm_on_start = scheduler_config.warm_on_start && !no_initial_refresh;

    if let Some(s) = warm_interval {
        scheduler_config.warm_interval_secs =
            SchedulerConfig::parse_interval(s).map_err(NewsError::InvalidArgument)?;
    }
    if let Some(s) = probe_interval {
        scheduler_config.probe_interval_secs =
            SchedulerConfig::parse_interval(s).map_err(NewsError::InvalidArgument)?;
    }

    let scheduler = RefreshScheduler::new(
        ctx.engine.clone(),
        ctx.cache.clone(),
        scheduler_config,
    );
    scheduler.run().await;
    Ok(())
}

fn split_tokens(arg: Option<&str>) -> Vec<String> {
    arg.map(|s| s.split(',').map(str::to_string).collect())
        .unwrap_or_default()
}

fn print_articles(response: &NewsResponse) {
    if response.articles.is_empty() {
        println!("No articles");
        return;
    }

    for article in &response.articles {
        let date = article
            .published_at
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "          ".to_string());

        println!("{} {}", date, article.display_title());
        if let Some(description) = &article.description {
            println!("  {}", description);
        }
        println!("  {}", article.url);
    }

    println!(
        "\n{} of {} total results",
        response.articles.len(),
        response.total_results
    );
}
