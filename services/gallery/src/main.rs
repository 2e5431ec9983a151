use std::sync::Arc;

use anyhow::Result;
use auth::SessionManager;
use common::{
    config::ClientConfig,
    http::{HttpApi, PortfolioApi},
    notify::Notifications,
    token_store::FileTokenStore,
};
use gallery::{
    FlagSurface, Key, PortfolioPage, ViewMode,
    home::{self, HomePage},
    lightbox::PhotoDetails,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// A line typed at the gallery prompt
#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Home,
    Collections,
    Show(Option<String>),
    Search(String),
    ClearSearch,
    View(ViewMode),
    Open(usize),
    Key(Key),
    Help,
    Quit,
}

fn parse_command(line: &str) -> Result<Command, String> {
    let line = line.trim();
    let (word, rest) = line
        .split_once(char::is_whitespace)
        .map(|(w, r)| (w, r.trim()))
        .unwrap_or((line, ""));

    let command = match word.to_lowercase().as_str() {
        "home" => Command::Home,
        "collections" | "ls" => Command::Collections,
        "show" if rest.is_empty() || rest == "all" => Command::Show(None),
        "show" => Command::Show(Some(rest.to_string())),
        "search" | "/" => Command::Search(rest.to_string()),
        "clear" => Command::ClearSearch,
        "view" => match rest {
            "grid" => Command::View(ViewMode::Grid),
            "masonry" => Command::View(ViewMode::Masonry),
            _ => return Err("usage: view grid|masonry".to_string()),
        },
        "open" => {
            let number: usize = rest
                .parse()
                .map_err(|_| "usage: open <number>".to_string())?;
            if number == 0 {
                return Err("photos are numbered from 1".to_string());
            }
            Command::Open(number - 1)
        }
        "next" | "right" => Command::Key(Key::ArrowRight),
        "prev" | "left" => Command::Key(Key::ArrowLeft),
        "esc" | "close" => Command::Key(Key::Escape),
        "i" | "info" => Command::Key(Key::Char('i')),
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        "" => return Err(String::new()),
        other => return Err(format!("unknown command: {}", other)),
    };
    Ok(command)
}

const HELP: &str = "\
commands:
  home                 latest collections
  collections          list collections
  show [id|all]        switch collection
  search <text>        filter photos, `clear` to reset
  view grid|masonry    layout
  open <n>             open photo n in the lightbox
  next | prev | info | esc   lightbox keys
  quit";

fn print_photos(page: &PortfolioPage, config: &ClientConfig) {
    if let Some(collection) = page.selected() {
        println!("== {} ==", collection.name);
        if let Some(description) = &collection.description {
            println!("{}", description);
        }
    }

    println!("{}", page.summary());
    if let Some(empty) = page.empty_state() {
        println!("{}", empty.message());
        return;
    }

    let columns = match page.view_mode() {
        ViewMode::Grid => 1,
        ViewMode::Masonry => 2,
    };
    for (row, chunk) in page.visible_photos().chunks(columns).enumerate() {
        let cells: Vec<String> = chunk
            .iter()
            .enumerate()
            .map(|(i, photo)| format!("{:>3}. {}", row * columns + i + 1, photo.title))
            .collect();
        println!("{}", cells.join("    "));
    }

    if page.lightbox().current().is_none() && !page.visible_photos().is_empty() {
        println!("(image base: {})", config.uploads_url);
    }
}

fn print_details(details: &PhotoDetails) {
    if let Some(description) = &details.description {
        println!("  {}", description);
    }
    if !details.tags.is_empty() {
        println!("  {}", details.tags.join(" "));
    }
    if let Some(camera) = &details.camera {
        println!("  Camera: {}", camera);
    }
    if let Some(lens) = &details.lens {
        println!("  Lens: {}", lens);
    }
    for (label, value) in &details.settings {
        println!("  {}: {}", label, value);
    }
    if let Some(collection) = &details.collection_name {
        println!("  Collection: {}", collection);
    }
    println!("  {}", details.date_label());
}

fn print_lightbox(page: &PortfolioPage, config: &ClientConfig) {
    let lightbox = page.lightbox();
    let Some(photo) = lightbox.current() else {
        return;
    };

    println!(
        "[{}] {}  {}",
        lightbox.counter().unwrap_or_default(),
        photo.title,
        config.image_url(&photo.filename)
    );
    if lightbox.info_visible() {
        if let Some(details) = lightbox.info_details() {
            print_details(&details);
        }
    }
}

fn print_notifications(notifications: &mut Notifications) {
    for notification in notifications.drain() {
        println!("{}", notification);
    }
}

async fn print_home(api: &dyn PortfolioApi, config: &ClientConfig) {
    let mut page = HomePage::new();
    page.load(api).await;

    println!("Latest Collections");
    if page.featured().is_empty() {
        println!("No collections yet.");
    }
    for collection in page.featured() {
        println!("- {} [{}]", collection.name, collection.id);
        println!("  {}", home::blurb(collection));
        if let Some(cover) = home::cover_url(config, collection) {
            println!("  {}", cover);
        }
    }
    print_notifications(page.notifications_mut());
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    info!("Starting portfolio gallery");

    let config = ClientConfig::from_env()?;
    let api: Arc<dyn PortfolioApi> = Arc::new(HttpApi::new(&config)?);
    let session = SessionManager::new(api.clone(), Arc::new(FileTokenStore::new(&config.token_path)));
    session.restore().await;

    let surface = Arc::new(FlagSurface::new());
    let mut page = PortfolioPage::new(session.api(), surface.clone());

    let route = std::env::args().nth(1);
    page.mount(route.as_deref()).await;
    print_photos(&page, &config);
    print_notifications(page.notifications_mut());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let command = match parse_command(&line) {
            Ok(command) => command,
            Err(message) => {
                if !message.is_empty() {
                    println!("{}", message);
                }
                continue;
            }
        };

        match command {
            Command::Quit => {
                print_notifications(page.notifications_mut());
                break;
            }
            Command::Help => println!("{}", HELP),
            Command::Home => print_home(api.as_ref(), &config).await,
            Command::Collections => {
                for collection in page.collections() {
                    println!("- {} [{}]", collection.name, collection.id);
                }
            }
            Command::Show(id) => {
                page.select_collection(id.as_deref()).await;
                print_photos(&page, &config);
            }
            Command::Search(term) => {
                page.set_search(&term);
                print_photos(&page, &config);
            }
            Command::ClearSearch => {
                page.clear_search();
                print_photos(&page, &config);
            }
            Command::View(mode) => {
                page.set_view_mode(mode);
                print_photos(&page, &config);
            }
            Command::Open(index) => {
                if let Err(e) = page.open_photo(index).map(|_| ()) {
                    println!("{}", e);
                    continue;
                }
                print_lightbox(&page, &config);
            }
            Command::Key(key) => {
                if !surface.keys_bound() {
                    println!("No photo open");
                    continue;
                }
                page.lightbox_mut().handle_key(key);
                if page.lightbox().is_open() {
                    print_lightbox(&page, &config);
                } else {
                    print_photos(&page, &config);
                }
            }
        }

        print_notifications(page.notifications_mut());
    }

    info!("Gallery closed");
    Ok(())
}
