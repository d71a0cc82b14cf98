//! MarsHab Headless Airlock Harness
//!
//! Validates the airlock coordinator end to end without an engine or DB.
//! Runs entirely in-process — no networking, no rendering.
//!
//! Usage:
//!   cargo run -p marshab-simtest
//!   cargo run -p marshab-simtest -- --verbose

use std::cell::RefCell;
use std::collections::BTreeSet;

use marshab_logic::airlock::{Airlock, AirlockHost, AirlockMode};
use marshab_logic::cycle::cycle_constants::CYCLE_TIME;
use marshab_logic::cycle::CycleState;
use marshab_logic::occupant::{MemoryRegistry, OccupantHandle, OccupantId, Position};
use marshab_logic::queue::queue_constants::MAX_WAITING_SLOTS;
use marshab_logic::reservation::reservation_constants::RESERVATION_PERIOD;

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

fn check(results: &mut Vec<TestResult>, name: &str, passed: bool, detail: String) {
    results.push(TestResult {
        name: name.into(),
        passed,
        detail,
    });
}

fn main() {
    let verbose = std::env::args().any(|a| a == "--verbose");
    println!("=== MarsHab Airlock Harness ===\n");

    let mut results = Vec::new();

    // 1. Pressurization cycle sweep
    results.extend(validate_cycle_machine(verbose));

    // 2. Queue bounds and chamber capacity
    results.extend(validate_queues(verbose));

    // 3. Operator election sweep
    results.extend(validate_election(verbose));

    // 4. Full EVA egress/ingress round trip against a building host
    results.extend(validate_eva_round_trip(verbose));

    // 5. Reservation expiry sweep
    results.extend(validate_reservations(verbose));

    // 6. Save/restore snapshot
    results.extend(validate_snapshot(verbose));

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

// ── Building host double ────────────────────────────────────────────────

/// A building-side host that actually tracks who is inside vs. outside,
/// so the harness can verify the hooks relocate people.
struct BuildingHost {
    inside: RefCell<BTreeSet<OccupantId>>,
    outside: RefCell<BTreeSet<OccupantId>>,
}

impl BuildingHost {
    fn new(inside: &[OccupantId]) -> Self {
        Self {
            inside: RefCell::new(inside.iter().copied().collect()),
            outside: RefCell::new(BTreeSet::new()),
        }
    }
}

impl AirlockHost for BuildingHost {
    fn egress(&self, occupant: &OccupantHandle) -> bool {
        self.inside.borrow_mut().remove(&occupant.id);
        self.outside.borrow_mut().insert(occupant.id);
        true
    }

    fn ingress(&self, occupant: &OccupantHandle) -> bool {
        self.outside.borrow_mut().remove(&occupant.id);
        self.inside.borrow_mut().insert(occupant.id);
        true
    }

    fn entity_name(&self) -> String {
        "EVA Airlock 1 at Sagan Station".to_string()
    }

    fn locale(&self) -> String {
        "Sagan Station".to_string()
    }

    fn available_interior_position(&self) -> Position {
        Position { x: 3.0, y: 1.0 }
    }

    fn available_exterior_position(&self) -> Position {
        Position { x: -3.0, y: 1.0 }
    }

    fn available_airlock_position(&self) -> Position {
        Position { x: 0.0, y: 1.0 }
    }
}

fn crew(people: &[(OccupantId, u32, u32)]) -> MemoryRegistry {
    let mut reg = MemoryRegistry::new();
    for &(id, level, exp) in people {
        reg.add(id, &format!("settler-{id}"), level, exp);
    }
    reg
}

// ── 1. Pressurization cycle ─────────────────────────────────────────────

fn validate_cycle_machine(_verbose: bool) -> Vec<TestResult> {
    println!("--- Pressurization Cycle ---");
    let mut results = Vec::new();
    let reg = crew(&[]);

    let mut a = Airlock::new(4);
    check(
        &mut results,
        "initial_steady_state",
        a.state() == CycleState::Pressurized && !a.is_inner_door_locked() && a.is_outer_door_locked(),
        format!("state={:?}", a.state()),
    );

    check(
        &mut results,
        "pressurize_from_pressurized_rejected",
        !a.set_pressurizing(),
        "already pressurized".into(),
    );

    a.set_activated(true);
    a.set_transitioning(true);
    let started = a.set_depressurizing();
    check(
        &mut results,
        "depressurize_starts",
        started && a.is_inner_door_locked() && a.is_outer_door_locked(),
        "both doors locked during transition".into(),
    );

    // Timer strictly decreases pulse by pulse while activated
    let mut last = a.remaining_cycle_time();
    let mut monotonic = true;
    while a.is_depressurizing() {
        a.time_passing(1.0, &reg);
        if a.is_depressurizing() {
            monotonic &= a.remaining_cycle_time() < last;
            last = a.remaining_cycle_time();
        }
    }
    check(
        &mut results,
        "countdown_strictly_decreases",
        monotonic,
        "remaining time shrinks every activated pulse".into(),
    );

    check(
        &mut results,
        "cycle_completes_to_depressurized",
        a.state() == CycleState::Depressurized
            && !a.is_outer_door_locked()
            && a.is_inner_door_locked()
            && !a.is_activated()
            && a.remaining_cycle_time() == CYCLE_TIME,
        format!("state={:?} timer={}", a.state(), a.remaining_cycle_time()),
    );

    // And back again
    a.set_activated(true);
    a.set_transitioning(true);
    a.set_pressurizing();
    for _ in 0..20 {
        a.time_passing(1.0, &reg);
    }
    check(
        &mut results,
        "cycle_returns_to_pressurized",
        a.state() == CycleState::Pressurized && !a.is_inner_door_locked(),
        format!("state={:?}", a.state()),
    );

    results
}

// ── 2. Queues & capacity ────────────────────────────────────────────────

fn validate_queues(_verbose: bool) -> Vec<TestResult> {
    println!("--- Queues & Capacity ---");
    let mut results = Vec::new();

    let mut a = Airlock::new(2);
    let mut all_in = true;
    for id in 1..=MAX_WAITING_SLOTS as OccupantId {
        all_in &= a.add_awaiting_outer(id);
    }
    check(
        &mut results,
        "waiting_set_fills_to_limit",
        all_in && a.awaiting_outer_count() == MAX_WAITING_SLOTS,
        format!("{} waiting", a.awaiting_outer_count()),
    );
    check(
        &mut results,
        "overflow_waiter_rejected",
        !a.add_awaiting_outer(99),
        "fifth waiter turned away".into(),
    );
    check(
        &mut results,
        "requeue_is_idempotent",
        a.add_awaiting_outer(2) && a.awaiting_outer_count() == MAX_WAITING_SLOTS,
        "existing waiter re-accepted without growth".into(),
    );

    // Round trip: add then purge restores the original occupancy
    let chamber_before = a.queues().chamber().clone();
    let outer_before = a.queues().awaiting_outer().clone();
    a.add_awaiting_inner(50);
    a.remove_occupant(50);
    check(
        &mut results,
        "add_remove_round_trip",
        a.queues().chamber() == &chamber_before
            && a.queues().awaiting_outer() == &outer_before
            && a.awaiting_inner_count() == 0,
        "occupancy observably unchanged".into(),
    );

    // Invariants hold across a random-ish operation burst
    let host = BuildingHost::new(&[]);
    let reg = crew(&[(1, 1, 1), (2, 2, 2), (3, 3, 3), (4, 4, 4)]);
    a.set_depressurizing();
    a.switch_to_steady_state();
    for round in 0..6 {
        for id in 1..=4 {
            a.enter_airlock(id, false, &host, &reg);
            if round % 2 == 1 {
                a.exit_airlock(id, false, &host, &reg);
            }
        }
    }
    check(
        &mut results,
        "invariants_hold_under_churn",
        a.chamber_count() <= a.capacity()
            && a.awaiting_inner_count() <= MAX_WAITING_SLOTS
            && a.awaiting_outer_count() <= MAX_WAITING_SLOTS,
        format!(
            "chamber {}/{}, inner {}, outer {}",
            a.chamber_count(),
            a.capacity(),
            a.awaiting_inner_count(),
            a.awaiting_outer_count()
        ),
    );

    results
}

// ── 3. Operator election ────────────────────────────────────────────────

fn validate_election(_verbose: bool) -> Vec<TestResult> {
    println!("--- Operator Election ---");
    let mut results = Vec::new();
    let host = BuildingHost::new(&[]);

    // Singleton pool: elected regardless of zero skill
    let reg = crew(&[(1, 0, 0)]);
    let mut a = Airlock::new(2);
    a.add_awaiting_outer(1);
    a.set_activated(true);
    a.time_passing(0.0, &reg);
    check(
        &mut results,
        "singleton_elected_with_zero_skill",
        a.operator_id() == Some(1),
        format!("operator={:?}", a.operator_id()),
    );

    // Skill level dominates experience
    let reg = crew(&[(1, 2, 5000), (2, 6, 0)]);
    let mut a = Airlock::new(2);
    a.add_awaiting_outer(1);
    a.add_awaiting_outer(2);
    a.set_activated(true);
    a.time_passing(0.0, &reg);
    check(
        &mut results,
        "higher_level_beats_experience",
        a.operator_id() == Some(2),
        format!("operator={:?}", a.operator_id()),
    );

    // Equal level: experience breaks the tie
    let reg = crew(&[(1, 3, 40), (2, 3, 400)]);
    let mut a = Airlock::new(2);
    a.add_awaiting_outer(1);
    a.add_awaiting_outer(2);
    a.set_activated(true);
    a.time_passing(0.0, &reg);
    check(
        &mut results,
        "experience_breaks_level_tie",
        a.operator_id() == Some(2),
        format!("operator={:?}", a.operator_id()),
    );

    // Chamber occupants outrank every waiter
    let reg = crew(&[(1, 9, 999), (2, 0, 0)]);
    let mut a = Airlock::new(2);
    a.add_awaiting_outer(1); // highly skilled, but still outside
    a.add_awaiting_inner(2);
    a.enter_airlock(2, true, &host, &reg);
    a.set_activated(true);
    a.time_passing(0.0, &reg);
    check(
        &mut results,
        "chamber_pool_outranks_waiters",
        a.operator_id() == Some(2),
        format!("operator={:?}", a.operator_id()),
    );

    // Operator is always inside some pool
    let member = a
        .operator_id()
        .map(|id| a.in_any_pool(id))
        .unwrap_or(false);
    check(
        &mut results,
        "operator_membership_invariant",
        member,
        "operator id belongs to an occupancy pool".into(),
    );

    results
}

// ── 4. EVA round trip ───────────────────────────────────────────────────

fn validate_eva_round_trip(_verbose: bool) -> Vec<TestResult> {
    println!("--- EVA Round Trip ---");
    let mut results = Vec::new();

    let reg = crew(&[(1, 2, 30), (2, 2, 80)]);
    let host = BuildingHost::new(&[1, 2]);
    let mut a = Airlock::new(4);

    // Egress: both settlers enter via the inner door, chamber depressurizes,
    // both step outside.
    a.set_mode(AirlockMode::Egress);
    a.add_awaiting_inner(1);
    a.add_awaiting_inner(2);
    let entered = a.enter_airlock(1, true, &host, &reg) && a.enter_airlock(2, true, &host, &reg);
    check(
        &mut results,
        "crew_enters_chamber",
        entered && a.chamber_count() == 2,
        format!("{} in chamber", a.chamber_count()),
    );

    a.set_activated(true);
    a.set_transitioning(true);
    a.set_depressurizing();
    for _ in 0..12 {
        a.time_passing(1.0, &reg);
    }
    check(
        &mut results,
        "operator_elected_during_cycle",
        a.operator_id() == Some(2),
        format!("operator={:?} (higher EVA experience)", a.operator_id()),
    );

    let exited = a.exit_airlock(1, true, &host, &reg) && a.exit_airlock(2, true, &host, &reg);
    check(
        &mut results,
        "crew_steps_onto_surface",
        exited && host.outside.borrow().len() == 2 && a.is_empty(),
        format!("{} outside", host.outside.borrow().len()),
    );

    // Placement queries hand out distinct spots per side of the hull
    let interior = host.available_interior_position();
    let exterior = host.available_exterior_position();
    let chamber = host.available_airlock_position();
    check(
        &mut results,
        "placement_positions_distinct",
        interior != exterior && interior != chamber && exterior != chamber,
        format!(
            "interior ({}, {}), chamber ({}, {}), exterior ({}, {})",
            interior.x, interior.y, chamber.x, chamber.y, exterior.x, exterior.y
        ),
    );

    // Ingress: back in through the outer door, repressurize, exit inside.
    a.set_mode(AirlockMode::Ingress);
    a.add_awaiting_outer(1);
    a.add_awaiting_outer(2);
    let reentered =
        a.enter_airlock(1, false, &host, &reg) && a.enter_airlock(2, false, &host, &reg);
    check(
        &mut results,
        "crew_reenters_chamber",
        reentered && host.inside.borrow().len() == 2,
        format!("{} back inside the hull", host.inside.borrow().len()),
    );

    a.set_activated(true);
    a.set_transitioning(true);
    a.set_pressurizing();
    for _ in 0..12 {
        a.time_passing(1.0, &reg);
    }
    let done = a.exit_airlock(1, false, &host, &reg) && a.exit_airlock(2, false, &host, &reg);
    check(
        &mut results,
        "crew_exits_to_interior",
        done && a.is_empty() && a.is_pressurized(),
        format!("state={:?}, chamber empty={}", a.state(), a.is_empty()),
    );

    results
}

// ── 5. Reservations ─────────────────────────────────────────────────────

fn validate_reservations(_verbose: bool) -> Vec<TestResult> {
    println!("--- Reservations ---");
    let mut results = Vec::new();

    let mut a = Airlock::new(2);
    let mut granted = 0;
    for id in 1..=6 {
        if a.reserve(id, 500) {
            granted += 1;
        }
    }
    check(
        &mut results,
        "reservations_bounded",
        granted == 4 && a.is_reservation_full(),
        format!("{granted} of 6 granted"),
    );

    check(
        &mut results,
        "reservation_survives_period",
        a.has_reservation(1, 500 + RESERVATION_PERIOD),
        "live at the period boundary".into(),
    );
    check(
        &mut results,
        "reservation_expires_after_period",
        !a.has_reservation(1, 501 + RESERVATION_PERIOD),
        "dropped one msol past the period".into(),
    );
    check(
        &mut results,
        "expiry_frees_a_slot",
        a.reserve(7, 560),
        "new settler takes the freed slot".into(),
    );

    results
}

// ── 6. Snapshot ─────────────────────────────────────────────────────────

fn validate_snapshot(verbose: bool) -> Vec<TestResult> {
    println!("--- Snapshot ---");
    let mut results = Vec::new();

    let reg = crew(&[(1, 3, 10), (2, 1, 0)]);
    let host = BuildingHost::new(&[1, 2]);
    let mut a = Airlock::new(3);
    a.add_awaiting_inner(1);
    a.enter_airlock(1, true, &host, &reg);
    a.add_awaiting_outer(2);
    a.set_activated(true);
    a.set_transitioning(true);
    a.set_depressurizing();
    a.time_passing(3.5, &reg);

    let json = match serde_json::to_string(&a) {
        Ok(j) => j,
        Err(e) => {
            check(&mut results, "snapshot_serialize", false, format!("{e}"));
            return results;
        }
    };
    if verbose {
        println!("  snapshot: {json}");
    }

    let restored: Airlock = match serde_json::from_str(&json) {
        Ok(b) => b,
        Err(e) => {
            check(&mut results, "snapshot_deserialize", false, format!("{e}"));
            return results;
        }
    };

    check(
        &mut results,
        "snapshot_round_trip",
        restored.capacity() == a.capacity()
            && restored.state() == a.state()
            && restored.is_activated() == a.is_activated()
            && restored.remaining_cycle_time() == a.remaining_cycle_time()
            && restored.queues().chamber() == a.queues().chamber()
            && restored.queues().awaiting_outer() == a.queues().awaiting_outer()
            && restored.operator_id() == a.operator_id(),
        "restored airlock matches the original".into(),
    );

    // Restored ids resolve against a fresh registry — handles were never
    // part of the snapshot.
    check(
        &mut results,
        "snapshot_ids_resolve_after_restore",
        restored.operator_name(&reg) == "settler-1",
        format!("operator_name={}", restored.operator_name(&reg)),
    );

    results
}
