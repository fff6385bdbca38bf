// Copyright 2021 Jeremy Wall
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
mod cli;
mod render;
mod repl;

use std::time::Duration;

use anyhow::Context;
use clap::{crate_authors, crate_version, Arg, ArgMatches, Command};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use kitchen_web::{HttpStore, Message};
use recipes::Category;

pub struct Config {
    pub api_root: String,
    pub image_base: String,
    pub debounce: Duration,
}

impl Config {
    fn from_matches(matches: &ArgMatches) -> anyhow::Result<Self> {
        // Both have defaults so they are always present.
        let api_root = matches
            .value_of("api_root")
            .unwrap_or("http://localhost:8000")
            .trim_end_matches('/')
            .to_owned();
        let image_base = matches
            .value_of("image_base")
            .map(|s| s.trim_end_matches('/').to_owned())
            .unwrap_or_else(|| api_root.clone());
        let millis: u64 = matches
            .value_of("debounce_ms")
            .unwrap_or("500")
            .parse()
            .context("--debounce-ms must be a number of milliseconds")?;
        Ok(Self {
            api_root,
            image_base,
            debounce: Duration::from_millis(millis),
        })
    }
}

fn create_app() -> Command<'static> {
    Command::new("kitchen")
        .version(crate_version!())
        .author(crate_authors!())
        .about("Kitchen recipe collection client")
        .arg(
            Arg::new("api_root")
                .long("api-root")
                .takes_value(true)
                .default_value("http://localhost:8000")
                .help("Root url of the recipe service"),
        )
        .arg(
            Arg::new("image_base")
                .long("image-base")
                .takes_value(true)
                .help("Base url for recipe images, defaults to the api root"),
        )
        .arg(
            Arg::new("debounce_ms")
                .long("debounce-ms")
                .takes_value(true)
                .default_value("500")
                .help("How long search input must pause before it is sent"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .multiple_occurrences(true)
                .help("Log more, repeat for more detail"),
        )
        .subcommand(Command::new("repl").about("Interactive recipe session (the default)"))
        .subcommand(Command::new("list").about("Print every recipe"))
        .subcommand(
            Command::new("search")
                .about("Print the recipes matching a query")
                .arg(Arg::new("QUERY").required(true).help("Text to search for")),
        )
        .subcommand(
            Command::new("category")
                .about("Print the recipes in a category")
                .arg(
                    Arg::new("TAG")
                        .required(true)
                        .help("One of veg, non-veg, breakfast, lunch, dinner"),
                ),
        )
}

fn init_logging(verbosity: u64) {
    let default = match verbosity {
        0 => "warn",
        1 => "info,kitchen=debug,kitchen_web=debug",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let matches = create_app().get_matches();
    init_logging(matches.occurrences_of("verbose"));
    let config = Config::from_matches(&matches)?;
    debug!(api_root = %config.api_root, debounce = ?config.debounce, "starting");
    let store = HttpStore::new(config.api_root.clone());
    async_std::task::block_on(async move {
        match matches.subcommand() {
            Some(("list", _)) => repl::once(store, config, Message::Refresh).await,
            Some(("search", sub)) => {
                // QUERY is required so clap has already rejected a missing one.
                let query = sub.value_of("QUERY").unwrap_or_default().to_owned();
                repl::once(store, config, Message::Search(query)).await
            }
            Some(("category", sub)) => {
                let category: Category = sub.value_of("TAG").unwrap_or_default().parse()?;
                repl::once(store, config, Message::SelectCategory(category)).await
            }
            _ => repl::run(store, config).await,
        }
    })
}
