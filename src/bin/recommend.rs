/**
 * Neighborly
 * Copyright (C) 2018 The Neighborly developers
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with this program. If not, see <http://www.gnu.org/licenses/>.
 */

use std::env;
use std::error::Error;
use std::str::FromStr;

use getopts::{Matches, Options};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use neighborly::error::RecommendError;
use neighborly::filter::FilterConfig;
use neighborly::io;
use neighborly::recommend::RecommendConfig;
use neighborly::report::Report;

fn main() {

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args: Vec<String> = env::args().collect();
    let program = args[0].clone();

    let mut opts = Options::new();
    opts.optopt("r", "ratings", "Ratings file (required). A CSV file with a header line and the \
        columns userId, movieId, rating and timestamp.", "PATH");
    opts.optopt("m", "movies", "Movies file (required). A CSV file with a header line and the \
        columns movieId and title.", "PATH");
    opts.optopt("u", "user", "Id of the user to recommend movies to (optional, defaults to 1).",
        "NUMBER");
    opts.optopt("k", "num-neighbors", "Number of similar users to consider (optional, defaults \
        to 20).", "NUMBER");
    opts.optopt("n", "num-recommendations", "Number of movies to recommend (optional, defaults \
        to 5).", "NUMBER");
    opts.optopt("", "min-user-ratings", "Minimum number of ratings per user (optional, defaults \
        to 30).", "NUMBER");
    opts.optopt("", "min-item-ratings", "Minimum number of ratings per movie (optional, \
        defaults to 30).", "NUMBER");
    opts.optopt("", "top-n", "Number of most active users and most rated movies to keep \
        (optional, defaults to 2000).", "NUMBER");
    opts.optopt("o", "outputfile", "Output file name (optional, output will be written to stdout \
        by default).", "PATH");
    opts.optopt("", "report", "Write the distributions of ratings, activity, popularity and \
        recommendation scores as JSON to this file (optional).", "PATH");
    opts.optflag("h", "help", "Print this help menu");

    let matches = match opts.parse(&args[1..]) {
        Ok(matches) => matches,
        Err(failure) => {
            let hint = failure.to_string();
            return print_usage_and_exit(&program, opts, Some(&hint))
        },
    };

    if matches.opt_present("h") {
        return print_usage_and_exit(&program, opts, None);
    }

    let (ratings_path, movies_path) = match (matches.opt_str("r"), matches.opt_str("m")) {
        (Some(ratings_path), Some(movies_path)) => (ratings_path, movies_path),
        _ => {
            return print_usage_and_exit(
                &program,
                opts,
                Some("Please specify the input files via --ratings and --movies."),
            );
        }
    };

    let defaults = FilterConfig::default();
    let recommend_defaults = RecommendConfig::default();

    let settings = number(&matches, "u", 1_u32).and_then(|user_id| {
        let filter_config = FilterConfig {
            min_user_ratings: number(&matches, "min-user-ratings", defaults.min_user_ratings)?,
            min_item_ratings: number(&matches, "min-item-ratings", defaults.min_item_ratings)?,
            top_n: number(&matches, "top-n", defaults.top_n)?,
            always_included_user: Some(user_id),
        };

        let recommend_config = RecommendConfig {
            num_neighbors: number(&matches, "k", recommend_defaults.num_neighbors)?,
            num_recommendations: number(&matches, "n", recommend_defaults.num_recommendations)?,
        };

        Ok((user_id, filter_config, recommend_config))
    });

    let (user_id, filter_config, recommend_config) = match settings {
        Ok(settings) => settings,
        Err(hint) => return print_usage_and_exit(&program, opts, Some(&hint)),
    };

    let paths = InputOutput {
        ratings_path,
        movies_path,
        output_path: matches.opt_str("o"),
        report_path: matches.opt_str("report"),
    };

    if let Err(failure) = compute_recommendations(&paths, user_id, &filter_config, &recommend_config) {
        eprintln!("{}", failure);
        std::process::exit(1);
    }
}

struct InputOutput {
    ratings_path: String,
    movies_path: String,
    output_path: Option<String>,
    report_path: Option<String>,
}

fn number<T>(matches: &Matches, name: &str, default: T) -> Result<T, String>
    where T: FromStr, T::Err: ToString {

    matches.opt_get_default(name, default)
        .map_err(|failure| format!("Problem with option '{}': {}", name, failure.to_string()))
}

fn print_usage_and_exit(
    program: &str,
    opts: Options,
    hint: Option<&str>
) {

    if let Some(hint) = hint {
        eprintln!("\n{}\n", hint);
    }

    let brief = format!("Usage: {} [options]", program);
    eprint!("{}", opts.usage(&brief));

    let status = exit_status(hint);
    if status != 0 {
        std::process::exit(status);
    }
}

/// Asking for help is fine, any other reason to print the usage is a failure.
fn exit_status(hint: Option<&str>) -> i32 {
    if hint.is_some() { 1 } else { 0 }
}

fn compute_recommendations(
    paths: &InputOutput,
    user_id: u32,
    filter_config: &FilterConfig,
    recommend_config: &RecommendConfig,
) -> Result<(), Box<dyn Error>> {

    info!("Reading movie titles from {}", paths.movies_path);
    let titles = io::read_movies(&mut io::csv_reader(&paths.movies_path)?)?;

    info!("Reading ratings from {}", paths.ratings_path);
    let events = io::read_rating_events(&mut io::csv_reader(&paths.ratings_path)?, &titles)?;

    info!("Found {} ratings of {} movies", events.len(), titles.len());

    let run = match neighborly::recommend_for(&events, user_id, filter_config, recommend_config) {
        Ok(run) => run,
        Err(RecommendError::EmptyResult) => {
            warn!("No ratings left after filtering, there is nothing to recommend.");
            return Ok(());
        },
        Err(failure) => return Err(failure.into()),
    };

    let num_user_ratings = run.dataset.iter()
        .filter(|event| event.user_id == user_id)
        .count();
    info!("Number of ratings by user {}: {}", user_id, num_user_ratings);

    info!("Writing {} recommendations for user {}...", run.recommendations.len(), user_id);
    let mut out = io::output(paths.output_path.clone())?;
    io::write_recommendations(&mut out, user_id, &run.recommendations)?;

    if let Some(ref report_path) = paths.report_path {
        let report = Report::build(
            &run.dataset,
            &run.ratings,
            &run.similarities,
            &run.recommendations,
            user_id,
            recommend_config.num_neighbors,
        )?;

        info!("Writing report to {}", report_path);
        io::write_report(&report, report_path)?;
    }

    Ok(())
}
