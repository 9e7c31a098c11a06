//! Integration tests for click-driven browsing over a generated word layout.

mod support;

use std::cell::RefCell;

use bibkeys_core::render::PlacedWord;
use bibkeys_core::selector::IgnoreReason;
use bibkeys_core::{
    AliasTable, ColorResolver, EventOutcome, KeywordMap, LinkOpener, PointerEvent, Record,
    RenderConfig, SelectionMode, SelectorSession, WordCloud, parse_bibtex,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use url::Url;

use support::FIXTURE_BIB;

#[derive(Default)]
struct Recorder(RefCell<Vec<String>>);

impl LinkOpener for Recorder {
    fn open(&self, url: &Url) {
        self.0.borrow_mut().push(url.to_string());
    }
}

fn setup() -> (Vec<Record>, KeywordMap, WordCloud) {
    let records = parse_bibtex(FIXTURE_BIB).unwrap();
    let map = KeywordMap::build(&records, &AliasTable::builtin());
    let cloud = WordCloud::generate(
        &map.frequency_series(),
        &RenderConfig::default(),
        &mut StdRng::seed_from_u64(7),
    );
    (records, map, cloud)
}

fn centre_click(cloud: &WordCloud, keyword: &str) -> PointerEvent {
    let word: &PlacedWord = cloud
        .words()
        .iter()
        .find(|w| w.keyword == keyword)
        .unwrap_or_else(|| panic!("{keyword} was not placed"));
    PointerEvent::Click {
        x: f64::from(word.x) + f64::from(word.width) / 2.0,
        y: f64::from(word.y) + f64::from(word.height) / 2.0,
    }
}

#[test]
fn test_all_keywords_are_placed_and_resolvable() {
    let (_, map, cloud) = setup();
    assert_eq!(cloud.words().len(), map.len());
    for word in cloud.words() {
        let (x, y) = (word.x + word.width / 2, word.y + word.height / 2);
        assert_eq!(cloud.resolve_color_at(x, y), Some(word.keyword.as_str()));
    }
}

#[test]
fn test_pop_session_drains_keyword_then_reports_exhausted() {
    let (records, map, cloud) = setup();
    let recorder = Recorder::default();
    let mut session = SelectorSession::new(
        &records,
        map,
        SelectionMode::Pop,
        StdRng::seed_from_u64(1),
        &recorder,
    );
    let click = centre_click(&cloud, "LES");

    let mut featured = Vec::new();
    for expected_remaining in [1, 0] {
        let EventOutcome::Selected(selection) = session.handle_event(click, &cloud) else {
            panic!("expected a selection");
        };
        assert_eq!(selection.keyword, "LES");
        assert_eq!(selection.remaining, expected_remaining);
        featured.push(selection.featured);
    }
    featured.sort_unstable();
    assert_eq!(featured, vec![0, 2]);

    let outcome = session.handle_event(click, &cloud);
    assert_eq!(
        outcome,
        EventOutcome::Exhausted {
            keyword: "LES".to_string()
        }
    );
    assert_eq!(
        outcome.to_string(),
        "Articles about LES\n------------------\nNo more articles to open\n"
    );

    let opened = recorder.0.borrow();
    assert!(opened.contains(&"https://doi.org/10.1234/wes.2020.001".to_string()));
    assert!(opened.contains(&"https://doi.org/10.5555/alm.2021".to_string()));

    // Record 2 is still listed under its other keywords.
    let map = session.into_keyword_map();
    assert!(map.records_for("ALM").unwrap().contains(&2));
    assert!(map.records_for("boundary layer").unwrap().contains(&2));
}

#[test]
fn test_open_session_repeats_without_mutation() {
    let (records, map, cloud) = setup();
    let original = map.clone();
    let mut session = SelectorSession::new(
        &records,
        map,
        SelectionMode::Open,
        StdRng::seed_from_u64(3),
        Recorder::default(),
    );
    let click = centre_click(&cloud, "LES");
    for _ in 0..5 {
        assert!(matches!(
            session.handle_event(click, &cloud),
            EventOutcome::Selected(_)
        ));
    }
    assert_eq!(session.keyword_map(), &original);
}

#[test]
fn test_record_without_doi_opens_search_link() {
    let (records, map, cloud) = setup();
    let recorder = Recorder::default();
    let mut session = SelectorSession::new(
        &records,
        map,
        SelectionMode::Pop,
        StdRng::seed_from_u64(0),
        &recorder,
    );

    let EventOutcome::Selected(selection) =
        session.handle_event(centre_click(&cloud, "shear"), &cloud)
    else {
        panic!("expected a selection");
    };
    assert_eq!(selection.featured, 1);
    assert_eq!(
        selection.link.as_ref().map(Url::as_str),
        Some("https://lmgtfy.com/?q=Wind+Shear+Effects")
    );
    assert_eq!(
        recorder.0.borrow().as_slice(),
        ["https://lmgtfy.com/?q=Wind+Shear+Effects".to_string()]
    );

    let text = selection.to_string();
    assert!(text.starts_with("Articles about shear\n"));
    assert!(text.contains("* Doe, Jane - Wind Shear Effects"));
}

#[test]
fn test_same_seed_selects_same_records() {
    let run = |seed| {
        let (records, map, cloud) = setup();
        let mut session = SelectorSession::new(
            &records,
            map,
            SelectionMode::Pop,
            StdRng::seed_from_u64(seed),
            Recorder::default(),
        );
        let click = centre_click(&cloud, "boundary layer");
        (0..2)
            .map(|_| match session.handle_event(click, &cloud) {
                EventOutcome::Selected(selection) => selection.featured,
                other => panic!("unexpected {other:?}"),
            })
            .collect::<Vec<_>>()
    };
    assert_eq!(run(99), run(99));
}

#[test]
fn test_background_and_out_of_range_clicks_change_nothing() {
    let (records, map, cloud) = setup();
    let original = map.clone();
    let recorder = Recorder::default();
    let mut session = SelectorSession::new(
        &records,
        map,
        SelectionMode::Pop,
        StdRng::seed_from_u64(0),
        &recorder,
    );
    let (width, height) = cloud.dimensions();
    let background = (0..height)
        .flat_map(|y| (0..width).map(move |x| (x, y)))
        .find(|&(x, y)| cloud.resolve_color_at(x, y).is_none())
        .unwrap();

    let outcomes = [
        session.handle_event(
            PointerEvent::Click {
                x: f64::from(background.0),
                y: f64::from(background.1),
            },
            &cloud,
        ),
        session.handle_event(
            PointerEvent::Click {
                x: f64::from(width) + 10.0,
                y: 0.0,
            },
            &cloud,
        ),
    ];
    assert_eq!(outcomes[0], EventOutcome::Ignored(IgnoreReason::Unmapped));
    assert_eq!(outcomes[1], EventOutcome::Ignored(IgnoreReason::OutOfBounds));
    assert_eq!(session.keyword_map(), &original);
    assert!(recorder.0.borrow().is_empty());
}
