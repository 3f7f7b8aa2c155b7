use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use colored::Colorize;
use service::{FilmRecommendation, ServiceConfig, SocialService};
use social_graph::{Catalog, Dataset, Event, EventId, Film, FilmId, User, UserId};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tracing::info;

/// filmgraph - social features of a film catalog
#[derive(Parser)]
#[command(name = "filmgraph")]
#[command(about = "Likes, friendships, popularity and recommendations over a film catalog", long_about = None)]
struct Cli {
    /// Directory holding users.dat, films.dat, likes.dat and friends.dat
    #[arg(short, long, env = "FILMGRAPH_DATA_DIR", default_value = "demos/data")]
    data_dir: PathBuf,

    /// Shared likes a user needs to act as a recommendation neighbor
    #[arg(long, env = "FILMGRAPH_MIN_OVERLAP", default_value = "0")]
    min_overlap: usize,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Films liked by the user with the most similar taste
    Recommend {
        #[arg(long)]
        user_id: UserId,

        /// Show why each film was suggested
        #[arg(long)]
        explain: bool,
    },

    /// Most liked films
    Popular {
        /// Number of films (defaults to 10)
        #[arg(long, allow_negative_numbers = true)]
        count: Option<i64>,

        /// Only films of this genre id
        #[arg(long)]
        genre_id: Option<u32>,

        /// Only films released in this year
        #[arg(long)]
        year: Option<i32>,
    },

    /// Users this user has added as friends
    Friends {
        #[arg(long)]
        user_id: UserId,
    },

    /// Friends both users have added
    CommonFriends {
        #[arg(long)]
        user_id: UserId,

        #[arg(long)]
        other_id: UserId,
    },

    /// Films both users like, most popular first
    CommonFilms {
        #[arg(long)]
        user_id: UserId,

        #[arg(long)]
        other_id: UserId,
    },

    /// Films of a director
    Director {
        #[arg(long)]
        director_id: u32,

        /// "likes" or "year"
        #[arg(long, default_value = "likes")]
        sort_by: String,
    },

    /// Activity feed of a user, built by replaying the dataset's likes and
    /// friendships as events
    Feed {
        #[arg(long)]
        user_id: UserId,

        /// Only events after this event id
        #[arg(long)]
        after: Option<EventId>,

        /// Page size
        #[arg(long)]
        limit: Option<usize>,

        /// Print events as JSON
        #[arg(long)]
        json: bool,
    },

    /// Concurrent mix of likes and recommendation requests
    Benchmark {
        /// Number of requests to make
        #[arg(long, default_value = "100")]
        requests: usize,

        /// Number of requests in flight at once
        #[arg(long, default_value = "10")]
        concurrent: usize,

        /// Share of requests that are likes (0.0 - 1.0)
        #[arg(long, default_value = "0.2")]
        write_ratio: f64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = ServiceConfig::default().with_min_overlap(cli.min_overlap);
    let dataset = load_dataset(&cli.data_dir)?;

    // Dispatch to appropriate command handler
    match cli.command {
        Commands::Recommend { user_id, explain } => {
            let service = SocialService::from_dataset(dataset, config);
            handle_recommend(&service, user_id, explain).await?
        }
        Commands::Popular {
            count,
            genre_id,
            year,
        } => {
            let service = SocialService::from_dataset(dataset, config);
            let films = service.popular(count, genre_id, year)?;
            print_films("Most popular films:", &films);
        }
        Commands::Friends { user_id } => {
            let service = SocialService::from_dataset(dataset, config);
            let friends = service.friends(user_id)?;
            print_users(&format!("Friends of user {}:", user_id), &friends);
        }
        Commands::CommonFriends { user_id, other_id } => {
            let service = SocialService::from_dataset(dataset, config);
            let common = service.common_friends(user_id, other_id)?;
            print_users(
                &format!("Common friends of users {} and {}:", user_id, other_id),
                &common,
            );
        }
        Commands::CommonFilms { user_id, other_id } => {
            let service = SocialService::from_dataset(dataset, config);
            let films = service.common_films(user_id, other_id)?;
            print_films(
                &format!("Films liked by both users {} and {}:", user_id, other_id),
                &films,
            );
        }
        Commands::Director {
            director_id,
            sort_by,
        } => {
            let service = SocialService::from_dataset(dataset, config);
            let films = service.director_films(director_id, &sort_by)?;
            print_films(
                &format!("Films of director {} by {}:", director_id, sort_by),
                &films,
            );
        }
        Commands::Feed {
            user_id,
            after,
            limit,
            json,
        } => handle_feed(dataset, config, user_id, after, limit, json)?,
        Commands::Benchmark {
            requests,
            concurrent,
            write_ratio,
        } => handle_benchmark(dataset, config, requests, concurrent, write_ratio).await?,
    }

    Ok(())
}

fn load_dataset(data_dir: &Path) -> Result<Dataset> {
    eprintln!("Loading dataset from {}...", data_dir.display());
    let start = Instant::now();
    let dataset = Dataset::load_from_dir(data_dir).context("Failed to load dataset")?;
    let (users, films) = dataset.catalog.counts();
    eprintln!(
        "{} Loaded {} users, {} films, {} likes, {} friendships in {:?}",
        "✓".green(),
        users,
        films,
        dataset.likes.len(),
        dataset.friends.len(),
        start.elapsed()
    );
    Ok(dataset)
}

/// Handle the 'recommend' command
async fn handle_recommend(service: &SocialService, user_id: UserId, explain: bool) -> Result<()> {
    let recommendations = service.recommendations(user_id).await?;
    print_recommendations(&recommendations, explain);
    Ok(())
}

/// Handle the 'feed' command
fn handle_feed(
    dataset: Dataset,
    config: ServiceConfig,
    user_id: UserId,
    after: Option<EventId>,
    limit: Option<usize>,
    json: bool,
) -> Result<()> {
    // Loaded edges carry no history; replaying them through the service
    // journals one event per edge
    let service = SocialService::replay_dataset(dataset, config);
    info!(
        "Journal holds {} events after replay",
        service.graph().feed().read().len()
    );

    let events = if after.is_some() || limit.is_some() {
        service.feed_page(user_id, after, limit)?
    } else {
        service.feed(user_id)?
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&events)?);
    } else {
        print_events(user_id, &events);
    }
    Ok(())
}

/// Handle the 'benchmark' command
async fn handle_benchmark(
    dataset: Dataset,
    config: ServiceConfig,
    requests: usize,
    concurrent: usize,
    write_ratio: f64,
) -> Result<()> {
    if requests == 0 || concurrent == 0 {
        bail!("requests and concurrent must both be positive");
    }

    let user_ids = dataset.catalog.user_ids();
    let film_ids = dataset.catalog.film_ids();
    if user_ids.is_empty() || film_ids.is_empty() {
        bail!("benchmark needs at least one user and one film");
    }
    let service = SocialService::from_dataset(dataset, config);
    let permits = Arc::new(Semaphore::new(concurrent));

    let wall_clock = Instant::now();
    let mut handles = vec![];
    for _ in 0..requests {
        let user_id = pick(&user_ids);
        let film_id: FilmId = pick(&film_ids);
        let is_write = rand::random::<f64>() < write_ratio;

        let service = service.clone();
        let permits = Arc::clone(&permits);
        let handle = tokio::spawn(async move {
            let _permit = permits.acquire_owned().await?;
            let start = Instant::now();
            if is_write {
                service.add_like(user_id, film_id)?;
            } else {
                service.recommendations(user_id).await?;
            }
            Ok::<_, anyhow::Error>(start.elapsed())
        });
        handles.push(handle);
    }

    // Wait for all tasks to complete and collect timings
    let mut timings: Vec<Duration> = vec![];
    for handle in handles {
        timings.push(handle.await??);
    }
    let total_time = wall_clock.elapsed();

    timings.sort();
    let busy: Duration = timings.iter().sum();
    let avg_latency = busy / timings.len() as u32;
    let percentile = |p: f64| timings[((timings.len() - 1) as f64 * p) as usize];
    let throughput = requests as f64 / total_time.as_secs_f64();

    println!("{}", "Benchmark results:".bold().blue());
    println!("Total time: {:?}", total_time);
    println!("Average latency: {:?}", avg_latency);
    println!("P50 latency: {:?}", percentile(0.50));
    println!("P95 latency: {:?}", percentile(0.95));
    println!("P99 latency: {:?}", percentile(0.99));
    println!("Throughput: {:.2} requests/second", throughput);

    let events = service.graph().feed().read().len();
    println!("Feed events recorded: {}", events);

    Ok(())
}

fn pick(ids: &[u32]) -> u32 {
    ids[rand::random::<u32>() as usize % ids.len()]
}

fn format_film(film: &Film) -> String {
    let genres = film
        .genres
        .iter()
        .map(|g| format!("{:?}", g))
        .collect::<Vec<_>>()
        .join(", ");
    format!("{} ({}) [{}]", film.name, film.release_year(), genres)
}

fn print_films(header: &str, films: &[Film]) {
    println!("{}", header.bold().blue());
    if films.is_empty() {
        println!("  {}", "(none)".dimmed());
    }
    for (rank, film) in films.iter().enumerate() {
        println!(
            "{}. {} {}",
            (rank + 1).to_string().green(),
            format_film(film),
            format!("#{}", film.id).dimmed()
        );
    }
}

fn print_users(header: &str, users: &[User]) {
    println!("{}", header.bold().blue());
    if users.is_empty() {
        println!("  {}", "(none)".dimmed());
    }
    for user in users {
        println!("{}{} ({}) #{}", "• ".green(), user.name, user.login, user.id);
    }
}

fn print_events(user_id: UserId, events: &[Event]) {
    println!("{}", format!("Feed of user {}:", user_id).bold().blue());
    if events.is_empty() {
        println!("  {}", "(no activity)".dimmed());
    }
    for event in events {
        println!(
            "{} {} {} {} {}",
            format!("[{}]", event.event_id).dimmed(),
            event.timestamp,
            event.event_type.to_string().cyan(),
            event.operation.to_string().yellow(),
            event.entity_id
        );
    }
}

/// Helper function to format and print recommendations
fn print_recommendations(recommendations: &[FilmRecommendation], explain: bool) {
    println!("{}", "Film Recommendations:".bold().blue());
    if recommendations.is_empty() {
        println!("  {}", "(nothing to suggest yet)".dimmed());
    }
    for (rank, rec) in recommendations.iter().enumerate() {
        println!(
            "{}. {} ({}) [{}]",
            (rank + 1).to_string().green(),
            rec.name,
            rec.year,
            rec.genres.join(", ")
        );
        if explain {
            println!("   Explanation: {}", rec.explanation);
        }
    }
}
