use dexle_game::{
    Catalog, DailyState, Direction, Entity, GameDate, Match, RecentIds, Verdict, evaluate,
    select_answer,
};

fn two_creature_catalog() -> Catalog {
    Catalog::from_json(
        r#"[
            {"id": 1, "name": "alpha", "generation": 1, "types": ["fire"],
             "height": 5, "weight": 10},
            {"id": 2, "name": "beta", "generation": 2, "types": ["water", "ice"],
             "height": 3, "weight": 8}
        ]"#,
    )
    .unwrap()
}

fn day(s: &str) -> GameDate {
    s.parse().unwrap()
}

fn other<'a>(catalog: &'a Catalog, answer: &Entity) -> &'a Entity {
    catalog
        .entities()
        .iter()
        .find(|entity| entity.id != answer.id)
        .unwrap()
}

#[test]
fn two_creature_day_is_deterministic_and_scored_by_value() {
    let catalog = two_creature_catalog();
    let answer = select_answer(&catalog, day("2024-01-01"), &[], 0);
    // |hash("2024-01-01-0")| is odd, so index 1 of two
    assert_eq!(answer.name, "beta");
    for _ in 0..3 {
        assert_eq!(select_answer(&catalog, day("2024-01-01"), &[], 0).id, answer.id);
    }

    let guess = other(&catalog, answer);
    let verdict = evaluate(guess, answer);
    assert_eq!(
        verdict,
        Verdict {
            generation: Direction::Lower,
            type1: Match::Wrong,
            type2: Match::Wrong,
            height: Direction::Higher,
            weight: Direction::Higher,
        }
    );
    assert!(!verdict.is_win());

    let reverse = evaluate(answer, guess);
    assert_eq!(reverse.height, Direction::Lower);
    assert_eq!(reverse.weight, Direction::Lower);
    assert_eq!(reverse.generation, Direction::Higher);
    assert!(evaluate(answer, answer).is_win());
}

#[test]
fn daily_lifecycle_over_two_days_with_reroll() {
    let catalog = two_creature_catalog();
    let first = DailyState::open_day(&catalog, day("2024-01-01"), None);
    assert_eq!(first.answer_id, 2);

    let rerolled = DailyState::rerolled(&catalog, day("2024-01-01"), Some(&first));
    assert_eq!(rerolled.reroll_count, 1);
    assert_eq!(rerolled.answer_id, 1, "only alpha is outside the history");
    assert_eq!(rerolled.recent_answer_ids, RecentIds::from(vec![2, 1]));

    // history now covers the catalog, so the fallback picks from everything
    let next = DailyState::open_day(&catalog, day("2024-01-02"), Some(&rerolled));
    assert_eq!(next.reroll_count, 0);
    assert!(catalog.get(next.answer_id).is_some());
    assert_eq!(next.recent_answer_ids.ids()[..2], [2, 1]);
}
