use super::fakes::FakeVideo;
use giantmidi_piano::pipeline::{PipelineContext, RateLimitPolicy};
use std::path::PathBuf;
use std::time::Duration;
use tempfile::TempDir;

/// Model sample rate used by the tests; small to keep fake signals short.
pub const TEST_SAMPLE_RATE: u32 = 100;

/// Composer pages of the test catalog. After ingest the rows are:
///
/// | row | composer | piece |
/// |---|---|---|
/// | 0 | Chopin | Ballade No.1 |
/// | 1 | Chopin | Nocturne Op.9 No.2 |
/// | 2 | Chopin | Étude Op.10 No.3 |
/// | 3 | Liszt | La Campanella |
/// | 4 | Liszt | Lost Piece |
/// | 5 | Satie | Gymnopédie No.1 |
pub const TEST_CATALOG: &str = r#"{
    "composers": [
        {
            "name": "Satie, Erik",
            "nationality": "French",
            "birth": "1866",
            "death": "1925",
            "pieces": ["Gymnopédie No.1 (Satie, Erik)"]
        },
        {
            "name": "Chopin, Frédéric",
            "nationality": "Polish",
            "pieces": [
                "Ballade No.1 (Chopin, Frédéric)",
                "Nocturne Op.9 No.2",
                "Étude Op.10 No.3"
            ]
        },
        {
            "name": "Liszt, Franz",
            "pieces": ["La Campanella", "Lost Piece"]
        }
    ]
}"#;

fn video(query: &str, title: &str, id: &str, score: f32, seconds: usize) -> FakeVideo {
    FakeVideo {
        query: query.to_string(),
        title: title.to_string(),
        id: id.to_string(),
        score,
        seconds,
    }
}

/// Search results for the test catalog. "Lost Piece" has none.
pub fn test_videos() -> Vec<FakeVideo> {
    vec![
        video(
            "Frédéric Chopin, Ballade No.1",
            "Chopin - Ballade No.1 (Zimerman)",
            "chopin01",
            0.75,
            600,
        ),
        video(
            "Frédéric Chopin, Nocturne Op.9 No.2",
            "Chopin Nocturne Op 9 No 2 (orchestra)",
            "chopin02",
            0.25,
            240,
        ),
        video(
            "Frédéric Chopin, Étude Op.10 No.3",
            "Tristesse - piano",
            "chopin03",
            1.0,
            200,
        ),
        video(
            "Franz Liszt, La Campanella",
            "La Campanella - Liszt",
            "liszt01",
            0.5,
            300,
        ),
        video(
            "Erik Satie, Gymnopédie No.1",
            "Gymnopédie No.1 - relaxing piano",
            "satie01",
            1.0,
            180,
        ),
    ]
}

/// A workspace holding the test catalog, and a context with no rate-limit sleep.
pub fn test_workspace() -> (TempDir, PipelineContext, PathBuf) {
    let dir = TempDir::new().unwrap();
    let catalog = dir.path().join("catalog.json");
    std::fs::write(&catalog, TEST_CATALOG).unwrap();
    let ctx = PipelineContext::new(dir.path())
        .with_rate_limit(RateLimitPolicy::new(Duration::ZERO).with_max_waits(10));
    (dir, ctx, catalog)
}

/// Catalog with one composer and `pieces` numbered pieces.
pub fn numbered_catalog(pieces: usize) -> String {
    let titles: Vec<String> = (0..pieces).map(|i| format!("\"Sonata No.{}\"", i)).collect();
    format!(
        r#"{{"composers": [{{"name": "Scarlatti, Domenico", "pieces": [{}]}}]}}"#,
        titles.join(", ")
    )
}
