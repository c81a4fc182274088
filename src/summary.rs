use std::collections::{BTreeMap, HashMap, HashSet};

use serde::Serialize;

use crate::domain::{Dataset, Rank};

pub const TOP_VALUES_PER_RANK: usize = 20;
pub const TOP_PHYLA: usize = 10;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LengthStats {
    pub mean: f64,
    pub median: f64,
    pub min: usize,
    pub max: usize,
    pub std_dev: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValueCount {
    pub value: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KingdomPhylumCount {
    pub kingdom: String,
    pub phylum: String,
    pub count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DatasetSummary {
    pub total_rows: usize,
    pub unique_keys: usize,
    pub unique_per_rank: BTreeMap<Rank, usize>,
    pub top_values: BTreeMap<Rank, Vec<ValueCount>>,
    pub kingdom_phylum: Vec<KingdomPhylumCount>,
    pub sequence_length: LengthStats,
}

impl DatasetSummary {
    pub fn from_dataset(dataset: &Dataset) -> Self {
        let unique_keys = dataset
            .iter()
            .map(|row| row.key.as_str())
            .collect::<HashSet<_>>()
            .len();
        let unique_per_rank = Rank::ALL
            .into_iter()
            .map(|rank| {
                let distinct = dataset
                    .iter()
                    .filter_map(|row| row.ranks.get(rank))
                    .collect::<HashSet<_>>()
                    .len();
                (rank, distinct)
            })
            .collect();
        let top_values = Rank::ALL
            .into_iter()
            .map(|rank| {
                let counts = count_values(dataset.iter().filter_map(|row| row.ranks.get(rank)));
                (rank, top(counts, TOP_VALUES_PER_RANK))
            })
            .collect();
        let lengths = dataset
            .iter()
            .map(|row| row.sequence_length())
            .collect::<Vec<_>>();

        Self {
            total_rows: dataset.len(),
            unique_keys,
            unique_per_rank,
            top_values,
            kingdom_phylum: kingdom_phylum(dataset),
            sequence_length: length_stats(lengths),
        }
    }
}

fn count_values<'a>(values: impl Iterator<Item = &'a str>) -> HashMap<&'a str, usize> {
    let mut counts = HashMap::new();
    for value in values {
        *counts.entry(value).or_insert(0) += 1;
    }
    counts
}

fn top(counts: HashMap<&str, usize>, limit: usize) -> Vec<ValueCount> {
    let mut sorted = counts.into_iter().collect::<Vec<_>>();
    sorted.sort_unstable_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    sorted
        .into_iter()
        .take(limit)
        .map(|(value, count)| ValueCount {
            value: value.to_string(),
            count,
        })
        .collect()
}

fn kingdom_phylum(dataset: &Dataset) -> Vec<KingdomPhylumCount> {
    let classified = dataset
        .iter()
        .filter(|row| {
            row.ranks.is_classified(Rank::Kingdom) && row.ranks.is_classified(Rank::Phylum)
        })
        .filter_map(|row| Some((row.ranks.get(Rank::Kingdom)?, row.ranks.get(Rank::Phylum)?)))
        .collect::<Vec<_>>();

    let phyla = top(count_values(classified.iter().map(|(_, phylum)| *phylum)), TOP_PHYLA)
        .into_iter()
        .map(|entry| entry.value)
        .collect::<HashSet<_>>();

    let mut cells: BTreeMap<(&str, &str), usize> = BTreeMap::new();
    for (kingdom, phylum) in classified {
        if phyla.contains(phylum) {
            *cells.entry((kingdom, phylum)).or_insert(0) += 1;
        }
    }
    cells
        .into_iter()
        .map(|((kingdom, phylum), count)| KingdomPhylumCount {
            kingdom: kingdom.to_string(),
            phylum: phylum.to_string(),
            count,
        })
        .collect()
}

fn length_stats(mut lengths: Vec<usize>) -> LengthStats {
    if lengths.is_empty() {
        return LengthStats::default();
    }
    lengths.sort_unstable();
    let n = lengths.len();
    let mean = lengths.iter().sum::<usize>() as f64 / n as f64;
    let median = if n % 2 == 0 {
        (lengths[n / 2 - 1] + lengths[n / 2]) as f64 / 2.0
    } else {
        lengths[n / 2] as f64
    };
    // sample standard deviation (n - 1)
    let std_dev = if n > 1 {
        let ss = lengths
            .iter()
            .map(|&len| (len as f64 - mean).powi(2))
            .sum::<f64>();
        (ss / (n - 1) as f64).sqrt()
    } else {
        0.0
    };
    LengthStats {
        mean,
        median,
        min: lengths[0],
        max: lengths[n - 1],
        std_dev,
    }
}
