use langton::analysis::{heading_counts, visit_histogram};
use langton::{AntConfig, Color, Fill, Heading, Rule, Simulation, Termination};

fn ten_step_run() -> langton::Run {
    let config = AntConfig::new(Rule::WhiteRight, 10, 10);
    Simulation::new(config).expect("valid config").run()
}

#[test]
fn ten_step_trace_positions_and_headings() {
    let run = ten_step_run();
    let cells: Vec<(usize, usize)> = run.history.iter().map(|r| (r.row, r.col)).collect();
    assert_eq!(
        cells,
        vec![
            (5, 5),
            (5, 6),
            (6, 6),
            (6, 5),
            (5, 5),
            (5, 4),
            (4, 4),
            (4, 5),
            (5, 5),
            (5, 4),
            (6, 4),
        ]
    );

    let headings: String = run.history.iter().map(|r| r.heading.token()).collect();
    assert_eq!(headings, "NESONONESOS");
    assert_eq!(run.termination, Termination::Completed);
    assert_eq!(run.steps_taken, 10);
}

#[test]
fn ten_step_trace_fractions() {
    let run = ten_step_run();
    let first = run.history[0];
    assert_eq!((first.white, first.black), (1.0, 0.0));
    assert_eq!(run.history[1].white, 99.0 / 100.0);
    assert_eq!(run.history[1].black, 1.0 / 100.0);

    // black cell count per record: +1 per white flip, -1 per black flip
    let expected_black = [0, 1, 2, 3, 4, 3, 4, 5, 6, 7, 6];
    for (r, &black) in run.history.iter().zip(&expected_black) {
        assert_eq!(r.white, (100 - black) as f64 / 100.0);
        assert_eq!(r.black, black as f64 / 100.0);
        assert_eq!(r.white + r.black, 1.0);
    }
    for pair in run.history.records().windows(2) {
        let delta = (pair[1].white - pair[0].white).abs();
        assert!((delta - 0.01).abs() < 1e-9);
    }
}

#[test]
fn final_plate_matches_the_trace() {
    let run = ten_step_run();
    let blacks: Vec<usize> = (0..run.plate.len())
        .filter(|&i| run.plate.data[i] == Color::Black)
        .collect();
    let mut expected: Vec<usize> = [(5, 6), (6, 6), (6, 5), (4, 4), (4, 5), (5, 5)]
        .iter()
        .map(|&(r, c)| run.plate.idx(r, c))
        .collect();
    expected.sort_unstable();
    assert_eq!(blacks, expected);
    assert_eq!(run.plate.snapshot().cells.iter().filter(|&&v| v == 1).count(), 6);
}

#[test]
fn hard_edge_stops_without_recording_the_escape() {
    // From the top-left corner the ant closes a 2x2 loop, comes back to a
    // black (0, 0) and turns left off the plate on step 5.
    let config = AntConfig {
        origin: Some((0, 0)),
        ..AntConfig::new(Rule::WhiteRight, 10, 50)
    };
    let run = Simulation::new(config).unwrap().run();
    assert_eq!(
        run.termination,
        Termination::OutOfBounds {
            step: 5,
            row: 0,
            col: -1
        }
    );
    assert_eq!(run.steps_taken, 5);
    assert_eq!(run.history.len(), 5);
    assert!(run.history.iter().all(|r| r.row < 10 && r.col < 10));
    let last = run.history.last().unwrap();
    assert_eq!((last.row, last.col, last.heading), (0, 0, Heading::North));
    // the discarded step still flipped (0, 0) back to white
    assert_eq!(run.plate.get(0, 0), Color::White);
}

#[test]
fn trap_always_completes_the_budget() {
    let config = AntConfig {
        origin: Some((0, 0)),
        trap: true,
        ..AntConfig::new(Rule::WhiteRight, 10, 300)
    };
    let run = Simulation::new(config).unwrap().run();
    assert_eq!(run.history.len(), 301);
    assert_eq!(run.termination, Termination::Completed);
    assert!(!run.escaped());
}

#[test]
fn random_fill_is_deterministic_per_seed() {
    let config = AntConfig {
        fill: Fill::Random,
        trap: true,
        seed: 1234,
        ..AntConfig::new(Rule::WhiteLeft, 24, 2_000)
    };
    let a = Simulation::new(config.clone()).unwrap().run();
    let b = Simulation::new(config.clone()).unwrap().run();
    assert_eq!(a.history, b.history);
    assert_eq!(a.plate, b.plate);

    let c = Simulation::new(AntConfig { seed: 1235, ..config }).unwrap().run();
    assert_ne!(a.plate, c.plate);
}

#[test]
fn highway_run_analysis_sums() {
    let config = AntConfig {
        trap: true,
        ..AntConfig::new(Rule::WhiteRight, 80, 11_000)
    };
    let run = Simulation::new(config).unwrap().run();
    let visits = visit_histogram(&run.history, 80);
    assert_eq!(visits.data.iter().map(|&v| v as usize).sum::<usize>(), run.history.len());
    for r in run.history.iter().take(50) {
        let n = run.history.iter().filter(|o| (o.row, o.col) == (r.row, r.col)).count();
        assert_eq!(visits.get(r.row, r.col) as usize, n);
    }

    let counts = heading_counts(&run.history);
    assert_eq!(counts.total(), run.history.len());
    assert!(Heading::ALL.iter().all(|&h| counts.get(h) > 0));
}

#[test]
fn simulate_reports_timings() {
    let (run, timings) = langton::simulate(&AntConfig::new(Rule::WhiteRight, 10, 10)).unwrap();
    assert_eq!(run.history.len(), 11);
    let names: Vec<&str> = timings.iter().map(|t| t.name).collect();
    assert_eq!(names, vec!["init", "walk", "TOTAL"]);
}

#[test]
fn simulate_rejects_empty_plate() {
    let err = langton::simulate(&AntConfig::new(Rule::WhiteRight, 0, 10)).err();
    assert_eq!(err, Some(langton::Error::EmptyPlate));
}
