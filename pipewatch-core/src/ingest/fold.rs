use crate::ingest::color::{Rgb, series_color};
use crate::ingest::types::{LogEntry, Message, Score};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, warn};

/// Client id to display name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameMap {
    names: HashMap<String, String>,
}

impl NameMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pair ids with names by position. Surplus on either side is dropped.
    pub fn from_pairs<I, N>(ids: I, names: N) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
        N: IntoIterator,
        N::Item: Into<String>,
    {
        let ids: Vec<String> = ids.into_iter().map(Into::into).collect();
        let names: Vec<String> = names.into_iter().map(Into::into).collect();

        if ids.len() != names.len() {
            warn!(
                ids = ids.len(),
                names = names.len(),
                "client ids and player names differ in count, pairing by position"
            );
        }

        Self {
            names: ids.into_iter().zip(names).collect(),
        }
    }

    /// Display name for `id`, falling back to the id itself.
    pub fn resolve<'a>(&'a self, id: &'a str) -> &'a str {
        self.names.get(id).map(String::as_str).unwrap_or(id)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub time: f64,
    pub score: Score,
}

/// Score history of one user, in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerSeries {
    user: String,
    label: String,
    color: Rgb,
    points: Vec<Point>,
}

impl PlayerSeries {
    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn color(&self) -> Rgb {
        self.color
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn latest(&self) -> Option<Point> {
        self.points.last().copied()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FoldEffect {
    Appended { created: bool },
    Ignored,
}

/// The derived per-user model.
///
/// Owned by exactly one folding loop per session; sinks only ever see `&SeriesModel`.
#[derive(Debug, Default)]
pub struct SeriesModel {
    names: NameMap,
    series: Vec<PlayerSeries>,
    by_user: HashMap<String, usize>,
}

impl SeriesModel {
    pub fn new(names: NameMap) -> Self {
        Self {
            names,
            series: Vec::new(),
            by_user: HashMap::new(),
        }
    }

    /// Apply one entry in place.
    ///
    /// Only `UpdateUser` touches the model. Pipe and collect messages are
    /// accepted and ignored.
    pub fn fold(&mut self, entry: &LogEntry) -> FoldEffect {
        let Message::UpdateUser { user, score } = &entry.msg else {
            return FoldEffect::Ignored;
        };

        let (index, created) = self.find_or_create(user);
        self.series[index].points.push(Point {
            time: entry.time,
            score: *score,
        });

        FoldEffect::Appended { created }
    }

    fn find_or_create(&mut self, user: &str) -> (usize, bool) {
        if let Some(&index) = self.by_user.get(user) {
            return (index, false);
        }

        let index = self.series.len();
        let label = self.names.resolve(user).to_string();
        debug!(user, label = %label, index, "new series");

        self.series.push(PlayerSeries {
            user: user.to_string(),
            label,
            color: Rgb::default(),
            points: Vec::new(),
        });
        self.by_user.insert(user.to_string(), index);

        // Every creation re-spreads the hues, so earlier series change color.
        let count = self.series.len();
        for (i, series) in self.series.iter_mut().enumerate() {
            series.color = series_color(i, count);
        }

        (index, true)
    }

    /// Series in creation order.
    pub fn series(&self) -> &[PlayerSeries] {
        &self.series
    }

    pub fn get(&self, user: &str) -> Option<&PlayerSeries> {
        self.by_user.get(user).map(|&i| &self.series[i])
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    pub fn names(&self) -> &NameMap {
        &self.names
    }

    /// Latest score per user id.
    pub fn results(&self) -> BTreeMap<String, Score> {
        self.series
            .iter()
            .filter_map(|s| s.latest().map(|p| (s.user.clone(), p.score)))
            .collect()
    }
}
