//! Duel integration tests: whole battles through the public controller API

use duel_atb::battle::*;
use duel_atb::combat::*;
use duel_atb::core::*;
use duel_atb::stage::{Animator, EventScripts, NullStage, ScriptTrigger};

/// Stage that records everything it was asked to play
#[derive(Debug, Default)]
struct RecordingStage {
    scripts: Vec<ScriptTrigger>,
    animations: Vec<(ActorId, String)>,
    ended: Option<BattleResult>,
}

impl Animator for RecordingStage {
    fn play_animation(&mut self, actor: ActorId, name: &str) -> f32 {
        self.animations.push((actor, name.to_string()));
        0.2
    }

    fn play_attack_animation(&mut self, lead: ActorId, _other: ActorId, name: &str) -> f32 {
        self.animations.push((lead, name.to_string()));
        0.4
    }
}

impl EventScripts for RecordingStage {
    fn play_event_script(&mut self, trigger: ScriptTrigger) -> f32 {
        self.scripts.push(trigger);
        0.5
    }

    fn on_battle_end(&mut self, result: BattleResult) {
        self.ended = Some(result);
    }
}

fn skirmish_roster() -> Roster {
    let mut ally = Combatant::test_fighter(ActorId(1), Side::Ally);
    ally.stats.attack = 14;
    let mut second = Combatant::test_fighter(ActorId(2), Side::Ally);
    second.stats.speed = 8.0;
    let mut enemy = Combatant::test_fighter(ActorId(3), Side::Enemy);
    enemy.health = Health::new(80);
    Roster::from_combatants([ally, second, enemy])
}

fn run_to_end<S: duel_atb::stage::Stage>(controller: &mut BattleController<S>, max_ticks: usize) {
    for _ in 0..max_ticks {
        if controller.is_finished() {
            return;
        }
        controller.update(0.1);
    }
}

fn run_until<S: duel_atb::stage::Stage>(controller: &mut BattleController<S>, phase: BattlePhase, max_ticks: usize) {
    for _ in 0..max_ticks {
        if controller.phase() == phase {
            return;
        }
        controller.update(0.1);
    }
    panic!("never reached {:?}, stuck in {:?}", phase, controller.phase());
}

#[test]
fn test_ai_battle_runs_to_a_result() {
    let mut controller = BattleController::new(
        BattleConfig::ai_vs_ai(17),
        skirmish_roster(),
        Box::new(SkillBook::new()),
        RecordingStage::default(),
    )
    .unwrap();

    run_to_end(&mut controller, 200_000);

    assert!(controller.is_finished());
    let result = controller.result().unwrap();
    let stage = controller.stage();
    assert_eq!(stage.scripts[0], ScriptTrigger::Title);
    assert_eq!(stage.scripts[1], ScriptTrigger::Prologue);
    let closing = match result {
        BattleResult::Victory => ScriptTrigger::Victory,
        BattleResult::Defeat => ScriptTrigger::Defeat,
    };
    assert_eq!(stage.scripts.last(), Some(&closing));
    assert_eq!(stage.ended, Some(result));
    assert!(!stage.animations.is_empty());

    // The losing side is wiped out
    let roster = controller.roster();
    match result {
        BattleResult::Victory => assert!(!roster.any_alive(Side::Enemy)),
        BattleResult::Defeat => assert!(!roster.any_alive(Side::Ally)),
    }
    for combatant in roster.iter() {
        let h = &combatant.health;
        assert!(h.residual() + h.fatal() <= h.max());
    }
}

#[test]
fn test_same_seed_replays_identically() {
    let play = |seed: u64| {
        let mut controller = BattleController::new(
            BattleConfig::ai_vs_ai(seed),
            skirmish_roster(),
            Box::new(SkillBook::new()),
            NullStage::instant(),
        )
        .unwrap();
        run_to_end(&mut controller, 200_000);
        (controller.result(), controller.context().turn, controller.log().len())
    };

    assert_eq!(play(5), play(5));
}

#[test]
fn test_human_defends_every_slot_then_confirms() {
    // Enemy is faster, so the AI attacks first and the human side predicts
    let mut enemy = Combatant::test_fighter(ActorId(9), Side::Enemy);
    enemy.stats.speed = 30.0;
    let roster = Roster::from_combatants([Combatant::test_fighter(ActorId(1), Side::Ally), enemy]);
    let mut controller =
        BattleController::new(BattleConfig::default(), roster, Box::new(SkillBook::new()), NullStage::instant())
            .unwrap();

    run_until(&mut controller, BattlePhase::PredictionSelectAttack, 500);
    assert_eq!(controller.context().actor, Some(ActorId(9)));
    let slots: Vec<usize> = controller.plan().actions().iter().map(|a| a.slot).collect();
    assert!(!slots.is_empty());

    // A response for an unknown slot changes nothing
    controller.submit(Intent::ChooseResponse {
        slot: 7,
        response: ResponseKind::Evade,
    });
    controller.update(0.0);
    assert!(controller.plan().responses().is_empty());

    for &slot in &slots {
        controller.submit(Intent::ChooseResponse {
            slot,
            response: ResponseKind::Evade,
        });
    }
    controller.update(0.0);
    assert_eq!(controller.phase(), BattlePhase::PredictionConfirm);
    assert!(controller.plan().all_responded());

    controller.submit(Intent::Confirm);
    controller.update(0.0);
    assert_eq!(controller.phase(), BattlePhase::Resolution);

    for _ in 0..200 {
        controller.update(0.1);
        if controller.log().phases().contains(&BattlePhase::Results) {
            break;
        }
    }
    let resolved = controller
        .log()
        .iter()
        .filter(|e| matches!(e, BattleEventType::SlotResolved { .. }))
        .count();
    assert_eq!(resolved, slots.len());
}

#[test]
fn test_counter_consumes_defender_uses() {
    let mut enemy = Combatant::test_fighter(ActorId(9), Side::Enemy);
    enemy.stats.speed = 30.0;
    let roster = Roster::from_combatants([Combatant::test_fighter(ActorId(1), Side::Ally), enemy]);
    let mut controller =
        BattleController::new(BattleConfig::default(), roster, Box::new(SkillBook::new()), NullStage::instant())
            .unwrap();

    run_until(&mut controller, BattlePhase::PredictionSelectAttack, 500);
    let smash_before = controller.roster().get(ActorId(1)).unwrap().hand.remaining(AttackKind::Smash);

    controller.submit(Intent::ChooseResponse {
        slot: 0,
        response: ResponseKind::Block,
    });
    controller.update(0.0);

    let defender = controller.roster().get(ActorId(1)).unwrap();
    assert_eq!(defender.hand.remaining(AttackKind::Smash), smash_before - 1);
    assert_eq!(controller.plan().response_for(0).map(|r| r.kind), Some(ResponseKind::Block));
}

#[test]
fn test_smoke_bomb_hides_every_slot() {
    let mut enemy = Combatant::test_fighter(ActorId(9), Side::Enemy);
    enemy.stats.speed = 30.0;
    let mut ally = Combatant::test_fighter(ActorId(1), Side::Ally);
    // Without concealment this ratio always reveals everything
    ally.stats.insight = 100;
    let roster = Roster::from_combatants([ally, enemy]);
    let mut controller =
        BattleController::new(BattleConfig::default(), roster, Box::new(SkillBook::new()), NullStage::instant())
            .unwrap();

    assert!(controller.use_consumable(ActorId(9), Consumable::SmokeBomb));
    run_until(&mut controller, BattlePhase::PredictionSelectAttack, 500);

    assert_eq!(controller.context().reveal_count, 0);
    assert_eq!(controller.plan().visible_count(), 0);
}

#[test]
fn test_full_insight_reveals_every_slot() {
    let mut enemy = Combatant::test_fighter(ActorId(9), Side::Enemy);
    enemy.stats.speed = 30.0;
    let mut ally = Combatant::test_fighter(ActorId(1), Side::Ally);
    ally.stats.insight = 100;
    let roster = Roster::from_combatants([ally, enemy]);
    let mut controller =
        BattleController::new(BattleConfig::default(), roster, Box::new(SkillBook::new()), NullStage::instant())
            .unwrap();

    run_until(&mut controller, BattlePhase::PredictionSelectAttack, 500);
    let plan = controller.plan();
    assert_eq!(plan.visible_count(), plan.actions().len());
}

#[test]
fn test_gauges_latch_while_turn_is_pending() {
    let mut controller = BattleController::new(
        BattleConfig::default(),
        skirmish_roster(),
        Box::new(SkillBook::new()),
        NullStage::instant(),
    )
    .unwrap();

    let mut last = 0.0;
    for _ in 0..500 {
        controller.update(0.1);
        let fill = controller.fill_ratio(ActorId(1));
        assert!((0.0..=1.0).contains(&fill));
        if controller.phase() == BattlePhase::ReservationSelectTarget {
            break;
        }
        assert!(fill >= last || last == 1.0);
        last = fill;
    }

    // The acting human is pinned full until its turn ends
    assert_eq!(controller.context().actor, Some(ActorId(1)));
    assert_eq!(controller.fill_ratio(ActorId(1)), 1.0);
    controller.update(1.0);
    assert_eq!(controller.fill_ratio(ActorId(1)), 1.0);
}

#[test]
fn test_config_from_toml_drives_the_battle() {
    let config = BattleConfig::from_toml_str(
        r#"
        max_reservations = 2
        human_side = "Enemy"
        seed = 8

        [policy]
        reserve_floor = 0
        "#,
    )
    .unwrap();
    assert_eq!(config.human_side, Some(Side::Enemy));

    let mut controller =
        BattleController::new(config, skirmish_roster(), Box::new(SkillBook::new()), NullStage::instant())
            .unwrap();
    run_until(&mut controller, BattlePhase::PredictionSelectAttack, 500);

    // Ally AI attacked the human enemy, never past two slots
    assert!(controller.plan().actions().len() <= 2);
    assert_eq!(controller.plan().capacity(), 2);
}
