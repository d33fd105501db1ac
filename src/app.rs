use std::path::Path;
use std::sync::{PoisonError, RwLock};

use itertools::Itertools;

use draft_advisor::advisor::{self, phase, SetContext};
use draft_advisor::catalog;
use draft_advisor::config::AdvisorConfig;
use draft_advisor::deck;
use draft_advisor::error::{AdvisorError, Res};
use draft_advisor::models::card::Color;
use draft_advisor::models::card_rating::StatLookup;
use draft_advisor::models::draft_data::DraftEvent;
use draft_advisor::models::recommendation::Recommendation;
use draft_advisor::reconstructor::DraftStateReconstructor;
use draft_advisor::signals;
use draft_advisor::stats;

use crate::action::Action;

/// One drafting session: the loaded set and the events seen so far.
pub struct App {
    reconstructor: DraftStateReconstructor,
    events: RwLock<Vec<DraftEvent>>,
}

impl App {
    pub fn new(ctx: SetContext) -> Self {
        App {
            reconstructor: DraftStateReconstructor::new(ctx.into()),
            events: RwLock::new(Vec::new()),
        }
    }

    pub fn open(dataset_path: &Path, config: AdvisorConfig) -> Res<Self> {
        let dataset = catalog::load_dataset(dataset_path, config.stats.min_sample_size)?;
        Ok(App::new(SetContext::from_dataset(dataset, config)))
    }

    fn ctx(&self) -> &SetContext {
        self.reconstructor.context()
    }

    /// Replaces the session with the events of a JSON lines file.
    pub fn replay_file(&self, path: &Path) -> Res<String> {
        let contents = std::fs::read_to_string(path)?;
        let (events, ignored) = parse_events(&contents);
        let state = self.reconstructor.rebuild(&events);
        let count = events.len();
        *self.events.write().unwrap_or_else(PoisonError::into_inner) = events;

        Ok(format!(
            "Replayed {} events ({} ignored): {} picks, now at {}",
            count,
            ignored,
            state.picks_made(),
            state.position()
        ))
    }

    pub fn push_event(&self, line: &str) -> String {
        let event = DraftEvent::from_json_line(line);
        if event == DraftEvent::Unrecognized {
            return "Ignored unrecognized event".to_string();
        }
        let state = self.reconstructor.apply(&event);
        self.events
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
        format!("Applied, now at {}", state.position())
    }

    pub fn pack_report(&self) -> String {
        let state = self.reconstructor.snapshot();
        if state.pack.is_empty() {
            return "No pack observed yet".to_string();
        }

        let phase = phase::resolve(state.position().overall(), &self.ctx().config.phases);
        let mut lines = vec![format!("{} ({})", state.position(), phase)];
        lines.extend(
            advisor::evaluate_pack(self.ctx(), &state)
                .iter()
                .enumerate()
                .map(|(i, rec)| format_recommendation(i + 1, rec)),
        );
        lines.join("\n")
    }

    pub fn pool_report(&self) -> String {
        let state = self.reconstructor.snapshot();
        if state.pool.is_empty() {
            return "Pool is empty".to_string();
        }

        let mut by_color = [0usize; 5];
        let mut lines = Vec::with_capacity(state.pool.len() + 1);
        for (i, card) in self.ctx().cards(&state.pool).enumerate() {
            for color in card.colors.iter() {
                by_color[color.index()] += 1;
            }
            lines.push(format!("{:>2}. {:<5} {}", i + 1, card.colors, card.name));
        }

        let counts = by_color
            .iter()
            .zip(['W', 'U', 'B', 'R', 'G'])
            .map(|(n, symbol)| format!("{}:{}", symbol, n))
            .join(" ");
        lines.insert(0, format!("{} cards | {}", state.pool.len(), counts));
        lines.join("\n")
    }

    pub fn signals_report(&self) -> String {
        let state = self.reconstructor.snapshot();
        let mut lines = signals::lane_report(&state.signals)
            .into_iter()
            .map(|lane| format!("{} {:<6} {:>7.1}", lane.color, lane.status, lane.value))
            .collect::<Vec<_>>();
        if !state.established.is_empty() {
            lines.push(format!("Established: {}", state.established));
        }
        lines.join("\n")
    }

    pub fn decks_report(&self) -> String {
        let state = self.reconstructor.snapshot();
        let variants = deck::synthesize_decks(self.ctx(), &state.pool);
        if variants.is_empty() {
            return "Not enough cards for a deck".to_string();
        }

        variants
            .iter()
            .map(|variant| {
                let basics = variant
                    .basics
                    .iter()
                    .filter(|(_, n)| *n > 0)
                    .map(|(color, n)| format!("{} {}", n, Color::basic_land_name(color)))
                    .join(", ");
                let spells = variant
                    .spells
                    .iter()
                    .chain(variant.nonbasic_lands.iter())
                    .map(|id| self.ctx().catalog.name_of(*id))
                    .join(", ");
                format!(
                    "{} | {:.1} ({})\n  Lands: {}\n  {}",
                    variant.label(),
                    variant.rating,
                    variant.projected_record(),
                    basics,
                    spells
                )
            })
            .join("\n")
    }

    pub fn card_report(&self, name: &str) -> Res<String> {
        let ctx = self.ctx();
        let card = ctx
            .catalog
            .find_by_name(name)
            .ok_or_else(|| AdvisorError::UnknownCard(name.to_string()))?;

        let mut lines = vec![format!(
            "{} [{}] {} cmc {}",
            card.name, card.colors, card.mana_cost.raw, card.cmc
        )];
        let metrics = ctx.global_metrics();
        match ctx.stats.global(card.id) {
            StatLookup::Known(record) => {
                lines.push(format!(
                    "GIH WR {:.1}% | grade {} | rating {:.1}/5 | {} games",
                    record.gihwr,
                    stats::letter_grade(record.gihwr, metrics),
                    stats::rating(record.gihwr, metrics),
                    record.sample_size
                ));
                let alsa = record.alsa.map_or("-".to_string(), |v| format!("{:.2}", v));
                let iwd = record.iwd.map_or("-".to_string(), |v| format!("{:+.1}", v));
                lines.push(format!("ALSA {} | IWD {}", alsa, iwd));
            }
            StatLookup::InsufficientSample { sample_size } => {
                lines.push(format!("Insufficient data ({} games)", sample_size))
            }
            StatLookup::Missing => lines.push("No data".to_string()),
        }

        let state = self.reconstructor.snapshot();
        if state.pack.contains(&card.id) {
            let recommendations = advisor::evaluate_pack(ctx, &state);
            if let Some((rank, rec)) = recommendations
                .iter()
                .find_position(|rec| rec.card == card.id)
            {
                lines.push(format_recommendation(rank + 1, rec));
            }
        }

        Ok(lines.join("\n"))
    }

    pub fn status_report(&self) -> String {
        let ctx = self.ctx();
        let state = self.reconstructor.snapshot();
        let events = self.events.read().unwrap_or_else(PoisonError::into_inner).len();
        let phase = phase::resolve(state.position().overall(), &ctx.config.phases);

        [
            format!(
                "Set {} | {} cards",
                state.set_code.as_deref().unwrap_or(&ctx.set_code),
                ctx.catalog.len()
            ),
            format!(
                "At {} ({}) | {} picks | {} seats",
                state.position(),
                phase,
                state.picks_made(),
                state.seats
            ),
            format!(
                "Established: {}",
                if state.established.is_empty() {
                    "-".to_string()
                } else {
                    state.established.to_string()
                }
            ),
            format!(
                "{} events | {} discrepancies | {} laps tracked",
                events,
                state.discrepancies.len(),
                state.missing.len()
            ),
        ]
        .join("\n")
    }
}

fn format_recommendation(rank: usize, rec: &Recommendation) -> String {
    format!(
        "{:>2}. {:>5.1}  {:<28} {:>5.1} {:+5.1} x{:.2} x{:.2} x{:.2}  {}",
        rank,
        rec.score,
        rec.name,
        rec.base_quality,
        rec.power_bonus,
        rec.commitment,
        rec.hunger,
        rec.wheel,
        rec.notes().join("; ")
    )
}

/// Typed events from JSON lines, with the number of lines that were dropped.
pub fn parse_events(contents: &str) -> (Vec<DraftEvent>, usize) {
    let (events, ignored): (Vec<_>, Vec<_>) = contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(DraftEvent::from_json_line)
        .partition(|event| *event != DraftEvent::Unrecognized);
    (events, ignored.len())
}

fn usage(cmd: &str, arg: &str) -> AdvisorError {
    AdvisorError::Command(format!("usage: {} <{}>", cmd, arg))
}

pub fn actions() -> Vec<Action> {
    vec![
        Action::new("replay", "Rebuild the draft from an event file", |app, args| {
            let path = args.first().ok_or_else(|| usage("replay", "file"))?;
            app.replay_file(Path::new(path))
        })
        .with_arg("file"),
        Action::new("event", "Apply one JSON event", |app, args| {
            if args.is_empty() {
                return Err(usage("event", "json"));
            }
            Ok(app.push_event(&args.join(" ")))
        })
        .with_arg("json"),
        Action::new("pack", "Rank the current pack", |app, _| Ok(app.pack_report())),
        Action::new("pool", "List picked cards", |app, _| Ok(app.pool_report())),
        Action::new("signals", "Show open and closed lanes", |app, _| {
            Ok(app.signals_report())
        }),
        Action::new("decks", "Suggest decks from the pool", |app, _| {
            Ok(app.decks_report())
        }),
        Action::new("card", "Look up a card by name", |app, args| {
            if args.is_empty() {
                return Err(usage("card", "name"));
            }
            app.card_report(&args.join(" "))
        })
        .with_arg("name"),
        Action::new("status", "Show the draft position", |app, _| {
            Ok(app.status_report())
        }),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const DATASET: &str = r#"{
        "meta": { "set_code": "TST" },
        "card_ratings": {
            "1": {
                "name": "Sunlit Hoplite",
                "colors": "W",
                "cmc": 2,
                "type_line": "Creature — Human Soldier",
                "mana_cost": "{1}{W}",
                "deck_colors": { "All Decks": { "gihwr": 58.0, "alsa": 4.0, "gih": 3000 } }
            },
            "2": {
                "name": "Reef Lurker",
                "colors": "U",
                "cmc": 3,
                "type_line": "Creature — Fish",
                "mana_cost": "{2}{U}",
                "deck_colors": { "All Decks": { "gihwr": 52.0, "alsa": 6.0, "gih": 3000 } }
            },
            "3": {
                "name": "Cinder Drake",
                "colors": "R",
                "cmc": 4,
                "type_line": "Creature — Drake",
                "mana_cost": "{3}{R}",
                "deck_colors": { "All Decks": { "gihwr": 55.0, "alsa": 3.0, "gih": 3000 } }
            }
        }
    }"#;

    fn app() -> App {
        let dataset = catalog::parse_dataset(DATASET, 200).unwrap();
        App::new(SetContext::from_dataset(dataset, AdvisorConfig::default()))
    }

    #[test]
    fn test_parse_events_counts_ignored() {
        let (events, ignored) = parse_events(
            "{\"type\":\"event_start\",\"set_code\":\"TST\"}\n\n{\"type\":\"draft_complete\"}\nnot json\n",
        );
        assert_eq!(events.len(), 1);
        assert_eq!(ignored, 2);
    }

    #[test]
    fn test_replay_file_and_reports() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"type":"event_start","set_code":"TST"}}"#).unwrap();
        writeln!(file, r#"{{"type":"pack_observed","pack":1,"pick":1,"cards":[1,2,3]}}"#).unwrap();
        writeln!(file, r#"{{"type":"pick_made","pack":1,"pick":1,"card":1}}"#).unwrap();
        writeln!(file, r#"{{"type":"pack_observed","pack":1,"pick":2,"cards":[2,3]}}"#).unwrap();

        let app = app();
        let summary = app.replay_file(file.path()).unwrap();
        assert!(summary.contains("Replayed 4 events"));
        assert!(summary.contains("p1p2"));

        let pack = app.pack_report();
        assert!(pack.starts_with("p1p2"));
        assert!(pack.contains("Cinder Drake"));
        assert!(!pack.contains("Sunlit Hoplite"));

        assert!(app.pool_report().contains("Sunlit Hoplite"));
        assert!(app.status_report().contains("4 events"));
    }

    #[test]
    fn test_push_event() {
        let app = app();
        assert_eq!(app.pack_report(), "No pack observed yet");
        assert_eq!(app.decks_report(), "Not enough cards for a deck");
        assert_eq!(app.push_event("{oops"), "Ignored unrecognized event");

        let reply = app.push_event(r#"{"type":"pack_observed","pack":0,"pick":0,"cards":[2,3],"indexing":"zero_based"}"#);
        assert_eq!(reply, "Applied, now at p1p1");
        assert!(app.pack_report().contains("Reef Lurker"));
    }

    #[test]
    fn test_card_report() {
        let app = app();
        let report = app.card_report("sunlit hoplite").unwrap();
        assert!(report.starts_with("Sunlit Hoplite [W]"));
        assert!(report.contains("GIH WR 58.0%"));
        assert!(matches!(
            app.card_report("zzzz"),
            Err(AdvisorError::UnknownCard(_))
        ));
    }

    #[test]
    fn test_actions_have_unique_commands() {
        let actions = actions();
        assert!(actions.iter().map(|a| a.cmd).all_unique());
        assert!(actions.iter().any(|a| a.cmd == "replay" && a.arg == Some("file")));
    }
}
