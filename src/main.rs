use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use internship_tracker::logging::init_tracing;
use internship_tracker::{
    open_store, Aggregator, ApplicationStatus, BookmarkOutcome, Config, HttpListingSource,
    ListingFetcher, ListingFilters, ListingRecord, Tracker,
};

#[derive(Parser, Debug)]
#[command(version, about = "Search internship postings and track applications", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Search the configured endpoints
    Search {
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        organization: Option<String>,
        #[arg(long)]
        location: Option<String>,
    },
    /// List bookmarked postings
    List,
    /// Bookmark a posting by hand
    Add {
        #[arg(long)]
        title: String,
        #[arg(long)]
        organization: String,
        /// YYYY-MM-DD
        #[arg(long)]
        date_posted: NaiveDate,
        #[arg(long)]
        location: String,
        #[arg(long)]
        url: String,
    },
    /// Remove a bookmark
    Remove { url: String },
    /// Record an application date and/or status
    Update {
        url: String,
        /// YYYY-MM-DD
        #[arg(long)]
        date_applied: Option<NaiveDate>,
        /// "Not Yet Applied", "Accepted", "Pending" or "Rejected"
        #[arg(long)]
        status: Option<ApplicationStatus>,
    },
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let config = Config::from_env().context("Failed to load configuration")?;
    let store = open_store(&config.store).context("Failed to open bookmark store")?;
    let source = HttpListingSource::new(config.api_key.clone(), config.request_timeout)
        .context("Failed to build upstream client")?;
    let tracker = Tracker::new(
        store,
        Aggregator::new(ListingFetcher::new(source)),
        config.endpoints.clone(),
        config.per_endpoint_cap,
    );

    match cli.command {
        Command::Search {
            title,
            organization,
            location,
        } => {
            let report = tracker.search(&ListingFilters::new(title, organization, location));
            for listing in &report.listings {
                print_listing(listing);
            }
            for failure in &report.failures {
                eprintln!("endpoint {} failed: {}", failure.endpoint, failure.error);
            }
        }
        Command::List => {
            for listing in tracker.list_bookmarks()? {
                print_listing(&listing);
            }
        }
        Command::Add {
            title,
            organization,
            date_posted,
            location,
            url,
        } => {
            let listing = ListingRecord::new(title, organization, date_posted, location, url);
            match tracker.bookmark(&listing)? {
                BookmarkOutcome::Added => println!("Bookmarked {}", listing.url),
                BookmarkOutcome::AlreadyBookmarked => {
                    println!("This posting has already been bookmarked: {}", listing.url)
                }
                BookmarkOutcome::Skipped => println!("Nothing to bookmark without a url"),
            }
        }
        Command::Remove { url } => {
            if tracker.remove_bookmark(&url)? {
                println!("Removed {url}");
            } else {
                println!("No bookmark for {url}");
            }
        }
        Command::Update {
            url,
            date_applied,
            status,
        } => {
            if tracker.update_application(&url, date_applied, status)? {
                println!("Updated {url}");
            } else {
                println!("No bookmark updated for {url}");
            }
        }
    }

    Ok(())
}

fn print_listing(listing: &ListingRecord) {
    let applied = listing
        .date_applied
        .map(|d| d.to_string())
        .unwrap_or_else(|| "-".to_string());
    let status = listing
        .application_status
        .map(|s| s.label())
        .unwrap_or("-");

    println!(
        "{} | {} | {} | {} | {} | applied: {} | status: {}",
        listing.title,
        listing.organization,
        listing.date_posted,
        listing.location,
        listing.url,
        applied,
        status
    );
}
