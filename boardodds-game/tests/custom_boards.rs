use boardodds_game::{
    BOARD_SIZE, BoardConfig, BoardLayout, CardEffect, CardGroup, DeparturePolicy, Destination,
    EventRuleTable, JsonBoard, OddsEngine, OddsError, Query, SquareFeature, SquareInfo,
    SquareRule, Stopping,
};

fn plain_layout() -> BoardLayout {
    BoardLayout::new(
        (0..BOARD_SIZE)
            .map(|i| SquareInfo::new(&format!("P{i}"), SquareFeature::Property))
            .collect(),
    )
}

#[test]
fn plain_board_converges_to_uniform() {
    let config = BoardConfig {
        layout: plain_layout(),
        ..BoardConfig::standard()
    };
    let rules = EventRuleTable::from_config(&config).unwrap();
    assert!(rules.iter().all(|(_, rule)| *rule == SquareRule::Plain));
    let analysis = OddsEngine::new(rules)
        .analyze(&Query::new(6).with_stopping(Stopping::converged()))
        .unwrap();
    assert!(analysis.converged);
    let uniform = 1.0 / BOARD_SIZE as f64;
    for square in 0..BOARD_SIZE {
        assert!((analysis.distribution.get(square) - uniform).abs() < 1e-9);
    }
}

#[test]
fn json_board_overrides_only_named_decks() {
    let json = r#"{
        "community_chest": {
            "name": "generous_chest",
            "size": 4,
            "groups": [
                { "cards": 2, "effect": "stay" },
                { "cards": 2, "effect": "move_to", "square": 0 }
            ]
        }
    }"#;
    let engine = OddsEngine::from_source(&JsonBoard::new(json)).unwrap();
    let SquareRule::Deck { deck, outcomes } = engine.rules().rule(17) else {
        panic!("community chest square lost its deck");
    };
    assert_eq!(deck, "generous_chest");
    assert_eq!(outcomes.len(), 2);
    assert!((outcomes[1].weight() - 0.5).abs() < f64::EPSILON);
    let matrix = engine
        .matrix(6, DeparturePolicy::RollDice)
        .unwrap();
    // From 10 a seven lands on CC2; half of that mass is sent to GO.
    assert!(matrix.get(10, 0) >= 6.0 / 36.0 * 0.5);
}

#[test]
fn relocation_loops_are_rejected() {
    let mut config = BoardConfig::standard();
    config.chance.groups[0] = CardGroup::new(6, CardEffect::MoveRelative { delta: 15 });
    config.chance.groups[7] = CardGroup::new(1, CardEffect::MoveRelative { delta: -15 });
    let rules = EventRuleTable::from_config(&config).unwrap();
    let err = OddsEngine::new(rules)
        .matrix(6, DeparturePolicy::RollDice)
        .unwrap_err();
    assert!(matches!(err, OddsError::ChainTooDeep { .. }), "{err}");
}

#[test]
fn chain_error_names_the_first_landing_square() {
    let mut config = BoardConfig::standard();
    config.chance.groups[0] = CardGroup::new(6, CardEffect::MoveRelative { delta: 15 });
    config.chance.groups[7] = CardGroup::new(1, CardEffect::MoveRelative { delta: -15 });
    let rules = EventRuleTable::from_config(&config).unwrap();
    let err = OddsEngine::new(rules)
        .matrix(6, DeparturePolicy::RollDice)
        .unwrap_err();
    // Row 0 is built first; a roll of 7 lands on CH1, which bounces to 22 and back.
    assert_eq!(
        err,
        OddsError::ChainTooDeep {
            origin: 7,
            max: boardodds_game::constants::MAX_CHAIN_DEPTH,
        }
    );
}

#[test]
fn huge_relative_move_wraps_instead_of_overflowing() {
    let json = r#"{
        "chance": {
            "name": "far_chance",
            "size": 16,
            "groups": [
                { "cards": 15, "effect": "stay" },
                { "cards": 1, "effect": "move_relative", "delta": 9223372036854775807 }
            ]
        }
    }"#;
    let config = BoardConfig::from_json(json).unwrap();
    let rules = EventRuleTable::from_config(&config).unwrap();
    let SquareRule::Deck { outcomes, .. } = rules.rule(7) else {
        panic!("chance square lost its deck");
    };
    // i64::MAX is 7 modulo 40.
    assert_eq!(outcomes[1].destination, Destination::Square(14));
    let engine = OddsEngine::from_source(&JsonBoard::new(json)).unwrap();
    let analysis = engine.analyze(&Query::new(6)).unwrap();
    assert!((analysis.distribution.total() - 1.0).abs() < 1e-9);
}

#[test]
fn unclosed_deck_in_json_is_fatal() {
    let json = r#"{ "chance": { "name": "thin", "size": 16, "groups": [ { "cards": 15, "effect": "stay" } ] } }"#;
    assert_eq!(
        BoardConfig::from_json(json),
        Err(OddsError::DeckClosure {
            deck: String::from("thin"),
            cards: 15,
            size: 16
        })
    );
}
