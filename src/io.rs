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

use std::fs::File;
use std::io;
use std::io::prelude::*;
use std::io::stdout;
use std::path::Path;

use fnv::FnvHashMap;
use serde_derive::{Deserialize, Serialize};
use tracing::warn;

use crate::recommend::{RecommendationSource, Recommendations};
use crate::report::Report;
use crate::types::RatingEvent;

/// Reads a CSV input file. We expect a header line and comma separation, as in the MovieLens
/// `ratings.csv` and `movies.csv` files.
pub fn csv_reader(file: &str) -> Result<csv::Reader<File>, csv::Error> {
    let reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .delimiter(b',')
        .from_path(file)?;

    Ok(reader)
}

#[derive(Deserialize)]
struct MovieRecord {
    #[serde(rename = "movieId")]
    movie_id: u32,
    title: String,
}

#[derive(Deserialize)]
struct RatingRecord {
    #[serde(rename = "userId")]
    user_id: u32,
    #[serde(rename = "movieId")]
    movie_id: u32,
    rating: f64,
    timestamp: i64,
}

/// Movie titles by movie id. Additional columns such as `genres` are ignored.
pub fn read_movies<R>(reader: &mut csv::Reader<R>) -> Result<FnvHashMap<u32, String>, csv::Error>
    where R: Read {

    let mut titles: FnvHashMap<u32, String> =
        FnvHashMap::with_capacity_and_hasher(100, Default::default());

    for record in reader.deserialize() {
        let movie: MovieRecord = record?;
        titles.insert(movie.movie_id, movie.title);
    }

    Ok(titles)
}

/// Ratings joined with their movie titles. Ratings of unknown movies are skipped.
pub fn read_rating_events<R>(
    reader: &mut csv::Reader<R>,
    titles: &FnvHashMap<u32, String>,
) -> Result<Vec<RatingEvent>, csv::Error> where R: Read {

    let mut events = Vec::with_capacity(1000);
    let mut num_skipped: u64 = 0;

    for record in reader.deserialize() {
        let rating: RatingRecord = record?;

        match titles.get(&rating.movie_id) {
            Some(title) => {
                events.push(RatingEvent::new(rating.user_id, title, rating.rating, rating.timestamp));
            },
            None => num_skipped += 1,
        }
    }

    if num_skipped > 0 {
        warn!("Skipped {} ratings of movies without a title", num_skipped);
    }

    Ok(events)
}

/// Struct used for JSON serialization of recommendations. Field names will be used in JSON.
#[derive(Serialize)]
struct RecommendedItem<'a> {
    for_user: u32,
    title: &'a str,
    score: f64,
    source: RecommendationSource,
}

/// Opens the file at `path`, or stdout if no path is given.
pub fn output(path: Option<String>) -> io::Result<Box<dyn Write>> {
    let out: Box<dyn Write> = match path {
        Some(path) => Box::new(File::create(&Path::new(&path))?),
        _ => Box::new(stdout())
    };

    Ok(out)
}

/// Output the recommendations in JSON format, one line per recommended item.
pub fn write_recommendations<W>(
    out: &mut W,
    user_id: u32,
    recommendations: &Recommendations,
) -> io::Result<()> where W: Write + ?Sized {

    for recommendation in recommendations.items.iter() {
        let item = RecommendedItem {
            for_user: user_id,
            title: &recommendation.title,
            score: recommendation.score,
            source: recommendations.source,
        };

        write!(out, "{}\n", serde_json::to_string(&item)?)?;
    }

    Ok(())
}

/// Writes the report series as a single JSON document.
pub fn write_report(report: &Report, report_path: &str) -> io::Result<()> {
    let file = File::create(&Path::new(report_path))?;
    serde_json::to_writer_pretty(file, report)?;

    Ok(())
}

#[cfg(test)]
mod tests {

    use crate::io;
    use crate::recommend::{Recommendation, RecommendationSource, Recommendations};

    const MOVIES: &str = "movieId,title,genres\n\
        1,Toy Story (1995),Adventure|Animation\n\
        2,Heat (1995),Action|Crime\n";

    const RATINGS: &str = "userId,movieId,rating,timestamp\n\
        1,1,4.0,964982703\n\
        1,2,3.5,964981247\n\
        7,3,5.0,964982224\n";

    fn reader(data: &str) -> csv::Reader<&[u8]> {
        csv::ReaderBuilder::new().has_headers(true).from_reader(data.as_bytes())
    }

    #[test]
    fn join_ratings_with_titles() {
        let titles = io::read_movies(&mut reader(MOVIES)).unwrap();
        assert_eq!(titles.len(), 2);
        assert_eq!(titles[&2], "Heat (1995)");

        let events = io::read_rating_events(&mut reader(RATINGS), &titles).unwrap();

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].user_id, 1);
        assert_eq!(events[0].item_title, "Toy Story (1995)");
        assert_eq!(events[1].rating, 3.5);
        assert_eq!(events[1].timestamp, 964981247);
    }

    #[test]
    fn malformed_rows_are_errors() {
        let titles = io::read_movies(&mut reader(MOVIES)).unwrap();
        let ratings = "userId,movieId,rating,timestamp\n1,1,not-a-number,5\n";

        assert!(io::read_rating_events(&mut reader(ratings), &titles).is_err());
    }

    #[test]
    fn recommendations_as_json_lines() {
        let recommendations = Recommendations {
            items: vec![
                Recommendation { title: "y".to_string(), score: 3.5 },
                Recommendation { title: "z".to_string(), score: 2.0 },
            ],
            source: RecommendationSource::GlobalAverage,
        };

        let mut out: Vec<u8> = Vec::new();
        io::write_recommendations(&mut out, 1, &recommendations).unwrap();

        let written = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = written.lines().collect();

        assert_eq!(lines.len(), 2);

        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["for_user"], 1);
        assert_eq!(first["title"], "y");
        assert_eq!(first["score"], 3.5);
        assert_eq!(first["source"], "global_average");
    }
}
