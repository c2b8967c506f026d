pub mod champion;
pub mod elo;
pub mod matchup;
pub mod pool;
pub mod report;
pub mod roster;

#[cfg(test)]
pub(crate) mod test_support {
    use super::matchup::Role;
    use super::roster::Roster;
    use crate::names::ChampionNames;
    use crate::snapshot::Snapshot;
    use serde_json::{json, Map, Value};
    use std::collections::HashMap;

    pub struct Blob {
        pub n: u64,
        pub wr: f64,
        pub pr: f64,
        pub avg: f64,
        pub lanes: Vec<(Role, f64)>,
        pub enemies: Vec<(i32, Role, u32, u32)>,
    }

    impl Blob {
        pub fn new(n: u64, wr: f64, pr: f64, lane: Role) -> Self {
            Blob {
                n,
                wr,
                pr,
                avg: 51.0,
                lanes: vec![(lane, 100.0)],
                enemies: Vec::new(),
            }
        }

        pub fn lanes(mut self, lanes: &[(Role, f64)]) -> Self {
            self.lanes = lanes.to_vec();
            self
        }

        pub fn vs(mut self, opponent: i32, role: Role, matches: u32, wins: u32) -> Self {
            self.enemies.push((opponent, role, matches, wins));
            self
        }

        fn to_json(&self, lane: Role) -> Value {
            let mut blob = json!({
                "header": { "n": self.n, "wr": self.wr, "pr": self.pr, "lane": lane.as_str() },
                "avgWinRate": self.avg,
                "nav": {
                    "lanes": self.lanes.iter()
                        .map(|(role, rate)| (role.as_str().to_string(), json!(rate)))
                        .collect::<Map<String, Value>>()
                },
            });
            for enemy_role in Role::ALL {
                let tuples: Vec<Value> = self
                    .enemies
                    .iter()
                    .filter(|(_, role, _, _)| *role == enemy_role)
                    .map(|(id, _, matches, wins)| json!([id, matches, wins, 0]))
                    .collect();
                blob[enemy_role.enemy_field()] = Value::Array(tuples);
            }
            blob
        }
    }

    pub fn build_roster(entries: Vec<(i32, Role, Blob)>, names: &[(&str, i32)]) -> Roster {
        let mut raw = Map::new();
        for (id, role, blob) in &entries {
            let roles = raw
                .entry(id.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            roles[role.as_str()] = blob.to_json(*role);
        }
        let snapshot = Snapshot::from_json_str(&Value::Object(raw).to_string()).unwrap();
        let names = ChampionNames::from_map(
            names.iter().map(|(name, id)| (name.to_string(), *id)).collect::<HashMap<_, _>>(),
        );
        Roster::from_snapshot(snapshot, Some(names)).unwrap()
    }

    /// Three mid laners in a 51% tier with hand-checkable matchups.
    ///
    /// | vs  | A      | B      | C       |
    /// |-----|--------|--------|---------|
    /// | A   | -      | 60/100 | 45/100  |
    /// | B   | 30/80  | -      | 50/100  |
    /// | C   | 60/120 | 40/100 | -       |
    pub fn three_champion_roster() -> Roster {
        let mid = Role::Middle;
        build_roster(
            vec![
                (1, mid, Blob::new(1000, 52.0, 5.0, mid).vs(2, mid, 100, 60).vs(3, mid, 100, 45)),
                (2, mid, Blob::new(800, 50.0, 4.0, mid).vs(1, mid, 80, 30).vs(3, mid, 100, 50)),
                (3, mid, Blob::new(1200, 51.0, 6.0, mid).vs(1, mid, 120, 60).vs(2, mid, 100, 40)),
            ],
            &[("Ahri", 1), ("Brand", 2), ("Cassiopeia", 3)],
        )
    }

    /// A top lane with rare and off-role picks, a flex pick and a lone jungler.
    pub fn lane_roster() -> Roster {
        let top = Role::Top;
        let flex = [(Role::Top, 80.0), (Role::Middle, 20.0)];
        build_roster(
            vec![
                (1, top, Blob::new(1000, 50.0, 5.0, top).lanes(&flex).vs(2, top, 100, 55)),
                (1, Role::Middle, Blob::new(200, 49.0, 1.0, Role::Middle).lanes(&flex)),
                (2, top, Blob::new(800, 50.0, 4.0, top).vs(1, top, 90, 40)),
                (4, top, Blob::new(600, 51.0, 3.0, top).vs(1, top, 50, 30)),
                (5, Role::Jungle, Blob::new(500, 50.0, 3.0, Role::Jungle)),
                (6, top, Blob::new(20, 45.0, 0.1, top)),
                (7, top, Blob::new(300, 50.0, 2.0, top).lanes(&[(Role::Top, 1.0), (Role::Bottom, 99.0)])),
            ],
            &[("Aatrox", 1), ("Darius", 2), ("Fiora", 4), ("Graves", 5), ("Heimerdinger", 6), ("Illaoi", 7)],
        )
    }
}
