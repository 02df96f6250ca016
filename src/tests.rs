#[cfg(test)]
mod tests {
    use std::thread;
    use std::time::Duration;

    use crate::{AStar, Backtracking, BacktrackingMode, BreadthFirst, Captured, CancellationToken, DetectedDanger, Grid, Heuristic, LegRequest, Location, PathFinder, Perception, Scenario, ScenarioSolver, Tag};

    fn locations(cells: &[(usize, usize)]) -> Vec<Location> {
        cells.iter().map(|(row, col)| Location(*row, *col)).collect()
    }

    fn courtyard() -> Grid {
        Grid::new(9, 2, 1, Location(0, 0), Location(4, 2), Location(2, 7), Location(7, 4), Location(0, 8), Location(1, 4)).unwrap()
    }

    fn corridor() -> Grid {
        Grid::new(9, 2, 1, Location(6, 6), Location(4, 2), Location(2, 7), Location(5, 5), Location(7, 6), Location(7, 0)).unwrap()
    }

    fn cornered() -> Grid {
        Grid::new(6, 1, 1, Location(2, 3), Location(2, 0), Location(0, 2), Location(0, 0), Location(5, 5), Location(5, 0)).unwrap()
    }

    struct Counting<F> {
        inner: F,
        calls: std::cell::Cell<usize>,
    }

    impl<F: PathFinder> PathFinder for Counting<F> {
        fn find_path(&self, grid: &Grid, request: &LegRequest, detected: &mut DetectedDanger) -> Result<Option<Vec<Location>>, Captured> {
            self.calls.set(self.calls.get() + 1);
            self.inner.find_path(grid, request, detected)
        }

        fn name(&self) -> &'static str {
            self.inner.name()
        }
    }

    #[test]
    fn display_courtyard() {
        assert_eq!(format!("{}", courtyard()), "S.......C
....E.xxx
xxxxx.xWx
xxxxx.xxx
xxWxx....
xxxxx....
xxxxx....
....G....
.........
");
    }

    #[test]
    fn display_corridor() {
        assert_eq!(format!("{}", corridor()), ".........
......xxx
xxxxx.xWx
xxxxx.xxx
xxWxx....
xxxxxG...
xxxxx.S..
E.....C..
.........
");
    }

    #[test]
    fn breadth_first_courtyard() {
        let grid = courtyard();
        let mut solver = ScenarioSolver::new(&grid, Perception::Adjacent);

        let steps = [Scenario::Direct, Scenario::ConcealmentFirst, Scenario::ConcealmentSecond]
            .map(|scenario| solver.evaluate(scenario, &BreadthFirst).unwrap().unwrap().steps());
        assert_eq!(steps, [16, 21, 23]);

        let route = solver.solve(&BreadthFirst).unwrap().unwrap();
        assert_eq!(route.scenario(), Scenario::Direct);
        assert_eq!(route.steps(), 16);
        assert_eq!(route.into_legs(), vec![
            locations(&[(0, 0), (0, 1), (0, 2), (0, 3), (1, 4), (2, 5), (3, 5), (4, 5), (5, 5), (6, 5), (7, 4)]),
            locations(&[(7, 4), (6, 5), (5, 5), (4, 5), (3, 5), (2, 5), (1, 4)]),
        ]);
    }

    #[test]
    fn astar_courtyard() {
        let grid = courtyard();
        let route = crate::solve(&grid, Perception::Adjacent, &AStar::default()).unwrap().unwrap();

        assert_eq!(route.scenario(), Scenario::Direct);
        assert_eq!(route.steps(), 16);
        assert_eq!(route.legs()[0].path, locations(&[(0, 0), (1, 1), (1, 2), (1, 3), (1, 4), (2, 5), (3, 5), (4, 5), (5, 5), (6, 5), (7, 4)]));
        assert_eq!(route.legs()[1].target, Tag::Exit);
    }

    #[test]
    fn backtracking_courtyard() {
        let grid = courtyard();

        let first = Backtracking::new(BacktrackingMode::FirstSuccess);
        let mut solver = ScenarioSolver::new(&grid, Perception::Adjacent);
        assert_eq!(solver.evaluate(Scenario::ConcealmentSecond, &first).unwrap().unwrap().steps(), 27);
        assert_eq!(solver.solve(&first).unwrap().unwrap().steps(), 16);

        let shortest = Backtracking::new(BacktrackingMode::Shortest);
        let mut solver = ScenarioSolver::new(&grid, Perception::Adjacent);
        assert_eq!(solver.evaluate(Scenario::ConcealmentSecond, &shortest).unwrap().unwrap().steps(), 23);

        let route = solver.solve(&shortest).unwrap().unwrap();
        assert_eq!(route.scenario(), Scenario::Direct);
        assert_eq!(route.steps(), 16);
    }

    #[test]
    fn astar_corridor() {
        let grid = corridor();
        let mut solver = ScenarioSolver::new(&grid, Perception::Ring);
        let finder = AStar::default();

        assert_eq!(solver.evaluate(Scenario::ConcealmentFirst, &finder).unwrap().unwrap().steps(), 8);
        assert_eq!(solver.evaluate(Scenario::ConcealmentSecond, &finder).unwrap().unwrap().steps(), 9);

        let route = solver.solve(&finder).unwrap().unwrap();
        assert_eq!(route.scenario(), Scenario::Direct);
        assert_eq!(route.steps(), 7);
        assert_eq!(route.into_legs(), vec![
            locations(&[(6, 6), (5, 5)]),
            locations(&[(5, 5), (6, 5), (7, 4), (7, 3), (7, 2), (7, 1), (7, 0)]),
        ]);
    }

    #[test]
    fn corridor_with_other_strategies() {
        let grid = corridor();

        // both wander into the unseen part of the danger zone
        assert_eq!(crate::solve(&grid, Perception::Ring, &BreadthFirst), Err(Captured { at: Location(4, 4) }));
        assert_eq!(crate::solve(&grid, Perception::Ring, &AStar::new(Heuristic::Chebyshev)), Err(Captured { at: Location(4, 4) }));

        for mode in [BacktrackingMode::FirstSuccess, BacktrackingMode::Shortest] {
            let route = crate::solve(&grid, Perception::Ring, &Backtracking::new(mode)).unwrap().unwrap();
            assert_eq!(route.steps(), 7);
        }
    }

    #[test]
    fn display_cornered() {
        let grid = cornered();
        assert_eq!(format!("{}", grid), "GxWx..
xxxx..
Wx.S..
xx....
......
E....C
");
    }

    #[test]
    fn every_strategy_is_captured_when_blind() {
        let grid = cornered();
        let request = LegRequest::new(grid.start(), Tag::Objective, Perception::Ring);
        let caught = Captured { at: Location(1, 2) };

        let strategies: [&dyn PathFinder; 4] = [
            &BreadthFirst,
            &AStar::default(),
            &Backtracking::new(BacktrackingMode::FirstSuccess),
            &Backtracking::new(BacktrackingMode::Shortest),
        ];
        for strategy in strategies {
            assert_eq!(strategy.find_path(&grid, &request, &mut DetectedDanger::new()), Err(caught), "{}", strategy.name());
            assert_eq!(crate::solve(&grid, Perception::Ring, strategy).unwrap_err(), caught, "{}", strategy.name());
        }
    }

    #[test]
    fn objective_on_edge_of_danger_zone() {
        let grid = cornered();
        let request = LegRequest::new(grid.start(), Tag::Objective, Perception::Adjacent);

        assert_eq!(BreadthFirst.find_path(&grid, &request, &mut DetectedDanger::new()), Ok(None));

        let path = BreadthFirst.find_path(&grid, &request.concealed(true), &mut DetectedDanger::new()).unwrap().unwrap();
        assert_eq!(path, locations(&[(2, 3), (1, 2), (0, 1), (0, 0)]));
        assert_eq!(grid.render_with_path(&path), "GoWx..
xxox..
Wx.S..
xx....
......
E....C
");
    }

    #[test]
    fn cornered_requires_concealment_first() {
        let grid = cornered();
        let mut solver = ScenarioSolver::new(&grid, Perception::Adjacent);

        let route = solver.solve(&BreadthFirst).unwrap().unwrap();
        assert_eq!(route.scenario(), Scenario::ConcealmentFirst);
        assert_eq!(route.steps(), 13);
        assert_eq!(route.into_legs(), vec![
            locations(&[(2, 3), (3, 3), (4, 4), (5, 5)]),
            locations(&[(5, 5), (4, 4), (3, 3), (2, 2), (1, 1), (0, 0)]),
            locations(&[(0, 0), (1, 0), (2, 1), (3, 0), (4, 0), (5, 0)]),
        ]);

        assert!(solver.is_infeasible(Scenario::Direct));
        assert!(solver.is_infeasible(Scenario::ConcealmentSecond));
        assert!(!solver.is_infeasible(Scenario::ConcealmentFirst));

        let astar = crate::solve(&grid, Perception::Adjacent, &AStar::default()).unwrap().unwrap();
        assert_eq!(astar.steps(), 13);
        assert_eq!(astar.legs()[0].path, locations(&[(2, 3), (3, 4), (4, 5), (5, 5)]));
    }

    #[test]
    fn infeasible_scenarios_are_skipped() {
        let grid = cornered();
        let mut solver = ScenarioSolver::new(&grid, Perception::Adjacent);
        let finder = Counting { inner: BreadthFirst, calls: Default::default() };

        solver.solve(&finder).unwrap();
        // one failed leg each for both scenarios starting with the objective, three legs for the other
        assert_eq!(finder.calls.get(), 5);

        finder.calls.set(0);
        assert_eq!(solver.solve(&finder).unwrap().unwrap().steps(), 13);
        assert_eq!(finder.calls.get(), 3);
    }

    #[test]
    fn detection_carries_over_between_legs() {
        let grid = courtyard();
        let mut detected = DetectedDanger::new();

        let first = LegRequest::new(grid.start(), Tag::Objective, Perception::Adjacent);
        let path = BreadthFirst.find_path(&grid, &first, &mut detected).unwrap().unwrap();
        let seen = detected.len();
        assert!(seen > 0);

        let second = LegRequest::new(*path.last().unwrap(), Tag::Exit, Perception::Adjacent).reset_detection(false);
        BreadthFirst.find_path(&grid, &second, &mut detected).unwrap().unwrap();
        assert!(detected.len() >= seen);

        // a reset leg behaves as if nothing had been perceived before
        let fresh = second.reset_detection(true);
        let mut reused = detected.clone();
        let mut unused = DetectedDanger::new();
        assert_eq!(
            BreadthFirst.find_path(&grid, &fresh, &mut reused),
            BreadthFirst.find_path(&grid, &fresh, &mut unused)
        );
        assert_eq!(reused, unused);
    }

    #[test]
    fn cancel_from_another_thread() {
        let grid = cornered();
        let finder = Backtracking::new(BacktrackingMode::Shortest);
        let token = finder.cancellation_token();
        // no route exists, so left alone this would enumerate every simple path in the safe region
        let request = LegRequest::new(grid.start(), Tag::Objective, Perception::Adjacent);

        let path = thread::scope(|scope| {
            let search = scope.spawn(|| finder.find_path(&grid, &request, &mut DetectedDanger::new()));
            thread::sleep(Duration::from_millis(50));
            token.cancel();
            search.join().unwrap()
        });

        assert_eq!(path, Ok(None));
    }

    #[test]
    fn cancelled_token_is_shared() {
        let token = CancellationToken::new();
        let finder = Backtracking::with_cancellation(BacktrackingMode::FirstSuccess, token.clone());
        assert!(!finder.cancellation_token().is_cancelled());

        token.cancel();
        assert!(finder.cancellation_token().is_cancelled());

        let grid = courtyard();
        assert_eq!(crate::solve(&grid, Perception::Adjacent, &finder), Ok(None));
    }

    #[test]
    fn cancelled_solve_keeps_scenarios_open() {
        let grid = courtyard();
        let mut solver = ScenarioSolver::new(&grid, Perception::Adjacent);
        let finder = Backtracking::new(BacktrackingMode::Shortest);
        finder.cancellation_token().cancel();

        assert_eq!(solver.solve(&finder), Ok(None));
        for scenario in [Scenario::Direct, Scenario::ConcealmentFirst, Scenario::ConcealmentSecond] {
            assert!(!solver.is_infeasible(scenario), "{scenario}");
        }

        let route = solver.solve(&BreadthFirst).unwrap().unwrap();
        assert_eq!(route.steps(), 16);
    }
}

#[cfg(test)]
mod properties {
    use itertools::Itertools;
    use petgraph::algo::dijkstra;
    use petgraph::graphmap::UnGraphMap;
    use proptest::prelude::*;

    use crate::search::is_safe;
    use crate::{AStar, Backtracking, BacktrackingMode, BreadthFirst, DetectedDanger, Grid, Heuristic, LegRequest, Location, PathFinder, Perception, Scenario, ScenarioSolver, Tag};

    fn board(size: usize, radii: (usize, usize), coords: &[(usize, usize)]) -> Option<Grid> {
        let locations = coords.iter().map(|(row, col)| Location(*row, *col)).collect_vec();
        let [start, observer1, observer2, objective, concealment, exit] = locations[..] else { return None };

        Grid::new(size, radii.0, radii.1, start, observer1, observer2, objective, concealment, exit).ok()
    }

    fn leg(grid: &Grid, target: Tag, concealed: bool) -> LegRequest {
        LegRequest::new(grid.start(), target, Perception::Adjacent).concealed(concealed)
    }

    fn find(finder: &dyn PathFinder, grid: &Grid, request: &LegRequest) -> Option<Vec<Location>> {
        // adjacent perception sees every cell before it is entered, so nothing is ever captured
        finder.find_path(grid, request, &mut DetectedDanger::new()).unwrap()
    }

    /// Independent shortest distance over the graph of safe cells.
    fn oracle(grid: &Grid, request: &LegRequest) -> Option<usize> {
        let size = grid.size();
        let mut graph = UnGraphMap::new();
        for location in (0..size).cartesian_product(0..size).map(Location::from) {
            if !is_safe(grid, location, request.concealed) {
                continue;
            }
            graph.add_node(location);
            for (_, neighbor) in grid.neighbors(location) {
                if is_safe(grid, neighbor, request.concealed) {
                    graph.add_edge(location, neighbor, ());
                }
            }
        }

        let goal = grid.position_of(request.target)?;
        if !graph.contains_node(request.start) {
            return None;
        }
        dijkstra(&graph, request.start, Some(goal), |_| 1usize).get(&goal).copied()
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(256))]
        #[test]
        fn searches_agree_with_oracle(
            coords in proptest::collection::vec((0usize..9, 0usize..9), 6),
            target_selector in 0usize..3,
            concealed in any::<bool>()
        ) {
            let Some(grid) = board(9, (2, 1), &coords) else { return Ok(()) };
            let target = [Tag::Objective, Tag::Concealment, Tag::Exit][target_selector];
            let request = leg(&grid, target, concealed);

            let expected = oracle(&grid, &request);
            let bfs = find(&BreadthFirst, &grid, &request);
            let chebyshev = find(&AStar::new(Heuristic::Chebyshev), &grid, &request);
            let euclidean = find(&AStar::default(), &grid, &request);

            prop_assert_eq!(bfs.as_ref().map(|path| path.len() - 1), expected, "coords={:?}", coords);
            prop_assert_eq!(chebyshev.as_ref().map(|path| path.len() - 1), expected, "coords={:?}", coords);
            prop_assert_eq!(euclidean.is_some(), expected.is_some());
            if let (Some(euclidean), Some(expected)) = (&euclidean, expected) {
                prop_assert!(euclidean.len() - 1 >= expected);
            }
        }

        #[test]
        fn paths_are_adjacent_and_safe(
            coords in proptest::collection::vec((0usize..9, 0usize..9), 6),
            concealed in any::<bool>()
        ) {
            let Some(grid) = board(9, (2, 1), &coords) else { return Ok(()) };
            let request = leg(&grid, Tag::Exit, concealed);

            for finder in [&BreadthFirst as &dyn PathFinder, &AStar::default()] {
                let Some(path) = find(finder, &grid, &request) else { continue };

                prop_assert_eq!(path.first(), Some(&grid.start()));
                prop_assert!(grid.cell(*path.last().unwrap()).contains(Tag::Exit));
                prop_assert!(path.iter().all(|location| is_safe(&grid, *location, concealed)));
                prop_assert!(path.iter().tuple_windows().all(|(a, b)| a.chebyshev(*b) == 1));
            }
        }

        #[test]
        fn repeated_searches_are_identical(
            coords in proptest::collection::vec((0usize..9, 0usize..9), 6)
        ) {
            let Some(grid) = board(9, (2, 1), &coords) else { return Ok(()) };
            let request = leg(&grid, Tag::Objective, false);
            let mut detected = DetectedDanger::new();

            for finder in [&BreadthFirst as &dyn PathFinder, &AStar::default()] {
                let first = finder.find_path(&grid, &request, &mut detected);
                let first_detected = detected.clone();
                let second = finder.find_path(&grid, &request, &mut detected);
                prop_assert_eq!(first, second);
                prop_assert_eq!(&first_detected, &detected);
            }
        }

        #[test]
        fn critical_tags_appear_once(
            coords in proptest::collection::vec((0usize..9, 0usize..9), 6)
        ) {
            let Some(grid) = board(9, (2, 1), &coords) else { return Ok(()) };

            for tag in [Tag::Start, Tag::Objective, Tag::Concealment, Tag::Exit] {
                let found = grid.locations_with(tag).collect_vec();
                prop_assert_eq!(found, vec![grid.position_of(tag).unwrap()]);
            }
            prop_assert!(grid.locations_with(Tag::Observer).count() >= 1);
        }

        #[test]
        fn concealment_detour_only_when_strictly_shorter(
            coords in proptest::collection::vec((0usize..9, 0usize..9), 6)
        ) {
            let Some(grid) = board(9, (2, 1), &coords) else { return Ok(()) };
            let mut solver = ScenarioSolver::new(&grid, Perception::Adjacent);
            let Some(route) = solver.solve(&BreadthFirst).unwrap() else { return Ok(()) };

            if route.scenario() == Scenario::ConcealmentFirst {
                let direct = ScenarioSolver::new(&grid, Perception::Adjacent).evaluate(Scenario::Direct, &BreadthFirst).unwrap();
                prop_assert!(direct.map_or(true, |direct| direct.steps() > route.steps()));
            }
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]
        #[test]
        fn shortest_backtracking_is_optimal(
            coords in proptest::collection::vec((0usize..6, 0usize..6), 6)
        ) {
            let Some(grid) = board(6, (1, 1), &coords) else { return Ok(()) };
            let request = leg(&grid, Tag::Objective, false);
            // exhaustive search without a bound is only practical when a route exists
            let Some(bfs) = find(&BreadthFirst, &grid, &request) else { return Ok(()) };

            let shortest = find(&Backtracking::new(BacktrackingMode::Shortest), &grid, &request).unwrap();
            let first = find(&Backtracking::new(BacktrackingMode::FirstSuccess), &grid, &request).unwrap();

            prop_assert_eq!(shortest.len(), bfs.len());
            prop_assert!(first.len() >= shortest.len());
        }
    }
}
