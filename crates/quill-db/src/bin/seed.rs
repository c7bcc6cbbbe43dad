//! # Seed Data Generator
//!
//! Populates the database with demo users and posts, then runs the
//! standard list queries against them.
//!
//! ## Usage
//! ```bash
//! # 25 users (every fifth one soft-deleted), 3 posts each
//! cargo run -p quill-db --bin seed
//!
//! # Custom amount
//! cargo run -p quill-db --bin seed -- --users 100
//!
//! # Database path (otherwise QUILL_DATABASE_PATH, then ./quill.db)
//! cargo run -p quill-db --bin seed -- --db ./data/quill.db
//! ```
//!
//! Every mutation goes through a `TracingPublisher`; run with
//! `RUST_LOG=info` to see the change notifications.

use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use quill_core::{ListParams, Post, PostWithUserName, User};
use quill_db::{
    list_options, logging, with_publishing, Database, DbConfig, QueryModifier, TracingPublisher,
};

const FIRST_NAMES: &[&str] = &[
    "Ada", "Grace", "Alan", "Barbara", "Donald", "Edsger", "Frances", "Ken", "Margaret", "Niklaus",
];

const TITLES: &[&str] = &["Getting started", "Notes from the week", "Open questions"];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init();

    let args: Vec<String> = env::args().collect();

    let mut user_count: usize = 25;
    let mut config = DbConfig::from_env()?;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--users" | "-u" => {
                if i + 1 < args.len() {
                    user_count = args[i + 1].parse().unwrap_or(25);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    config.database_path = PathBuf::from(&args[i + 1]);
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Quill Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -u, --users <N>    Number of users to generate (default: 25)");
                println!("  -d, --db <PATH>    Database file path (default: QUILL_DATABASE_PATH or ./quill.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("Quill Seed Data Generator");
    println!("=========================");
    println!("Database: {}", config.database_path.display());
    println!("Users:    {}", user_count);
    println!();

    let db = Database::new(config)
        .await?
        .with_publisher(Arc::new(TracingPublisher));

    let users = db.users();
    let posts = db.posts();

    let existing = users.count_with_conditions(&[], &[]).await?;
    if existing > 0 {
        println!("Database already has {} users, skipping seed.", existing);
        println!("Delete the database file to regenerate.");
        return Ok(());
    }

    for n in 0..user_count {
        let first = FIRST_NAMES[n % FIRST_NAMES.len()];
        let mut user = users
            .create(
                User::new(format!("{} {:03}", first, n), format!("{}.{}@example.com", first.to_lowercase(), n)),
                &[],
            )
            .await?;

        for (t, title) in TITLES.iter().enumerate() {
            let mut post = Post::new(user.id, *title, format!("{} writes about {}.", first, title.to_lowercase()));
            post.published = t % 2 == 0;
            // Bulk content, no per-post notification.
            posts.create(post, &[with_publishing(false)]).await?;
        }

        if n % 5 == 4 {
            user.is_deleted = true;
            users.update(user, &[]).await?;
        }
    }

    println!("✓ Seeded {} users and {} posts", user_count, user_count * TITLES.len());

    // Second page of visible users, by name
    let params = ListParams::parse(Some("2"), Some("10"), None, "name ASC")?;
    let page: Vec<User> = users
        .get_with_conditions(&[QueryModifier::exclude_soft_deleted()], &list_options(&params))
        .await?;
    let visible = users
        .count_with_conditions(&[QueryModifier::exclude_soft_deleted()], &[])
        .await?;

    println!();
    println!("Users page {} ({} visible in total):", params.page, visible);
    for user in &page {
        println!("  {:<16} {}", user.name, user.email);
    }

    // Latest posts with their author's name
    let with_author = QueryModifier::new(|q| {
        q.join("JOIN users ON users.id = posts.user_id")
            .select(vec!["posts.*".into(), "users.name AS user_name".into()])
            .filter("posts.published = ?", vec![true.into()])
    });
    let recent: Vec<PostWithUserName> = posts
        .get_with_conditions(
            &[with_author],
            &[QueryModifier::sorting(["posts.created_at DESC"]), QueryModifier::paging(1, 5)],
        )
        .await?;

    println!();
    println!("Latest published posts:");
    for post in &recent {
        println!("  {:<24} by {}", post.title, post.user_name);
    }

    println!();
    println!("✓ Seed complete!");

    db.close().await;
    Ok(())
}
