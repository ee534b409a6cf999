//! Command implementations

use blog_core::{SyncEngine, SyncOptions, SyncReport};
use blog_images::{ImageStore, ObjectStoreImages, WebDavImages};
use colored::Colorize;

use crate::clients::snapas::SnapAsClient;
use crate::clients::webdav::WebDavClient;
use crate::clients::{http_client, writeas::WriteAsClient};
use crate::error::Result;
use crate::settings::{ImageHosting, Settings};

/// Log in, pick the image backend and run the selected sync phases.
pub fn run_sync(settings: &Settings, options: SyncOptions) -> Result<SyncReport> {
    let http = http_client(&settings.http)?;

    tracing::info!(endpoint = %settings.writeas_endpoint, "Logging into Write.as");
    let blog = WriteAsClient::login(
        http.clone(),
        &settings.writeas_endpoint,
        &settings.login,
        &settings.password,
    )?;

    let images: Box<dyn ImageStore> = match &settings.hosting {
        ImageHosting::SnapAs { endpoint } => Box::new(ObjectStoreImages::new(
            SnapAsClient::new(http.clone(), endpoint, blog.token()),
            &settings.root,
            settings.retry,
        )),
        ImageHosting::WebDav {
            endpoint,
            published_url,
            login,
            password,
        } => {
            let client = WebDavClient::new(http.clone(), endpoint, login, password);
            client.connect()?;
            Box::new(WebDavImages::new(
                client,
                &settings.root,
                published_url,
                settings.retry,
            ))
        }
    };

    tracing::info!(root = %settings.root.display(), alias = %settings.alias, "Synchronizing");
    let mut engine = SyncEngine::new(&settings.root, &settings.alias, blog, images, settings.retry);
    let report = engine.run(options)?;

    print_report(&report);
    Ok(report)
}

fn print_report(report: &SyncReport) {
    for slug in &report.downloaded {
        println!("{} {}", "downloaded".cyan(), slug);
    }
    for slug in &report.created {
        println!("{} {}", "created".green(), slug);
    }
    for slug in &report.updated {
        println!("{} {}", "updated".yellow(), slug);
    }

    if report.is_noop() {
        println!("{} {}", "Up to date:".green().bold(), report);
    } else {
        println!("{} {}", "Done:".green().bold(), report);
    }
}
