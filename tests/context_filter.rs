use anyhow::{Result, anyhow};
use urban_context::context::export::{states_from_json, states_to_json};
use urban_context::context::{
    ContextFilterConfig, ContextFilterError, EventLevel, FilterEvent, RecordingObserver,
    TracingObserver, run, run_first_pass,
};
use urban_context::{
    Building, BuildingInventory, Construction, OrientedBoundingBox, Point, Polyface, Polygon,
    Room, Surface, Vector,
};

fn cube(x: f64) -> Result<Polyface> {
    Polyface::from_box(10., 10., 10., Some((x, 0., 0.)), "shape")
}

/// Modeled 10 m cube starting at `x`, optionally with a window on its west wall.
fn modeled(id: &str, x: f64, window: Option<Construction>) -> Result<Building> {
    let pf = cube(x)?;
    let mut room = Room::from_polyface("room", &pf, Some(Construction::opaque("brick", 0.3, 0.3)))?;
    if let Some(glazing) = window {
        let west = room
            .faces_mut()
            .iter_mut()
            .find(|f| f.identifier == "room_wall_3")
            .ok_or_else(|| anyhow!("no west wall"))?;
        let win = Polygon::new(
            "win",
            vec![
                Point::new(x, 3., 3.),
                Point::new(x, 7., 3.),
                Point::new(x, 7., 6.),
                Point::new(x, 3., 6.),
            ],
            Some(Vector::new(-1., 0., 0.)),
        )?;
        west.add_aperture(Surface::aperture("room_win", win, glazing))?;
    }
    let obb = OrientedBoundingBox::from_polyface(&pf)?;
    Ok(Building::modeled(id, pf, vec![room])?.with_oriented_bounding_box(obb))
}

/// Target at x = 0, a modeled neighbour at x = 20 with a window facing the
/// target, a basic building hidden behind it at x = 40 and a far building.
fn block(window: Construction) -> Result<BuildingInventory> {
    let mut inv = BuildingInventory::new();
    inv.add_building(modeled("target", 0., None)?)?;
    inv.add_building(modeled("east", 20., Some(window))?)?;

    let hidden = cube(40.)?;
    let obb = OrientedBoundingBox::from_polyface(&hidden)?;
    inv.add_building(Building::basic("hidden", hidden)?.with_oriented_bounding_box(obb))?;

    let far = cube(1000.)?;
    let obb = OrientedBoundingBox::from_dimensions(Point::new(1000., 0., 0.), 30., 10., 10., 10.)?;
    inv.add_building(Building::basic("far", far)?.with_oriented_bounding_box(obb))?;
    Ok(inv)
}

fn target_config() -> ContextFilterConfig {
    ContextFilterConfig {
        building_id_list: vec!["target".to_string()],
        consider_windows: true,
        keep_discarded_faces: true,
        ..Default::default()
    }
}

#[test]
fn test_urban_block() -> Result<()> {
    let mut inv = block(Construction::window("glass", 0.08, 0.1))?;
    let obs = RecordingObserver::new();
    let reports = run(&mut inv, &target_config(), &obs)?;
    assert!(reports.first_pass.is_success());
    assert!(reports.second_pass.is_success());

    let state = inv.state("target").ok_or_else(|| anyhow!("no state"))?;
    let selected: Vec<&str> = state
        .selected_context_building_ids()
        .iter()
        .map(|s| s.as_str())
        .collect();
    assert_eq!(selected, vec!["east", "hidden"]);

    // The west wall of east and its window are visible, hidden is behind east
    let shades: Vec<String> = state
        .context_shading_list()
        .iter()
        .map(|s| s.identifier())
        .collect();
    assert_eq!(shades, vec!["east_room_wall_3", "east_room_win"]);
    let window = &state.context_shading_list()[1];
    assert!(window.is_specular);
    assert!((window.solar_reflectance() - 0.08).abs() < 1e-12);
    assert!((window.source_surface.centroid().x - 19.99).abs() < 1e-9);

    // 4 other outdoor surfaces of east, 5 of hidden
    assert_eq!(state.discarded_surfaces().map(|d| d.len()), Some(9));
    assert_eq!(state.number_of_rays(), 3);
    assert!(state.consider_windows());

    assert_eq!(inv.shade_constructions().len(), 2);
    assert!(obs.events_at_least(EventLevel::Warning).is_empty());
    assert!(
        obs.events()
            .iter()
            .any(|e| matches!(e, FilterEvent::SceneMeshBuilt { num_buildings: 4, .. }))
    );
    // Two modeled buildings meshed from their rooms, two basic ones from footprints
    let counts = obs.events().iter().find_map(|e| match e {
        FilterEvent::SceneMeshBuilt { sources, .. } => Some(*sources),
        _ => None,
    });
    assert_eq!(counts.map(|c| (c.merged_facade, c.rooms, c.extruded_footprint)), Some((0, 2, 2)));
    Ok(())
}

#[test]
fn test_rerun_keeps_cached_results() -> Result<()> {
    let mut inv = block(Construction::window("glass", 0.08, 0.1))?;
    let config = target_config();
    run(&mut inv, &config, &TracingObserver)?;
    let duration = inv.state("target").map(|s| s.first_pass_duration());

    let obs = RecordingObserver::new();
    let reports = run(&mut inv, &config, &obs)?;
    assert_eq!(reports.first_pass.skipped, vec!["target".to_string()]);
    assert_eq!(reports.second_pass.skipped, vec!["target".to_string()]);
    assert_eq!(inv.state("target").map(|s| s.first_pass_duration()), duration);
    assert_eq!(
        inv.state("target").map(|s| s.context_shading_list().len()),
        Some(2)
    );

    let overwrite = ContextFilterConfig {
        overwrite_first_pass: true,
        ..config
    };
    run_first_pass(&mut inv, &overwrite, &obs)?;
    let state = inv.state("target").ok_or_else(|| anyhow!("no state"))?;
    assert!(state.first_pass_done());
    assert!(!state.second_pass_done());
    assert!(state.context_shading_list().is_empty());
    Ok(())
}

#[test]
fn test_dynamic_glazing_fails_target_only() -> Result<()> {
    let mut inv = block(Construction::dynamic_window("electrochromic"))?;
    let obs = RecordingObserver::new();
    let config = ContextFilterConfig {
        consider_windows: true,
        ..Default::default()
    };
    let reports = run(&mut inv, &config, &obs)?;

    // Both modeled buildings are targets; only target sees the dynamic window of east
    assert_eq!(reports.first_pass.completed.len(), 2);
    assert_eq!(reports.second_pass.completed, vec!["east".to_string()]);
    assert_eq!(reports.second_pass.failed.len(), 1);
    let err = &reports.second_pass.failed[0];
    assert_eq!(err.building_id(), "target");
    assert!(matches!(err, ContextFilterError::DynamicGlazing { .. }));
    assert!(inv.state("target").is_some_and(|s| !s.second_pass_done()));
    assert_eq!(obs.events_at_least(EventLevel::Error).len(), 1);
    Ok(())
}

#[test]
fn test_invalid_parameters_are_replaced() -> Result<()> {
    let mut inv = block(Construction::window("glass", 0.08, 0.1))?;
    let obs = RecordingObserver::new();
    let config = ContextFilterConfig {
        building_id_list: vec!["target".to_string(), "ghost".to_string()],
        min_vf_criterion: 2.,
        number_of_rays: 5,
        ..Default::default()
    };
    let reports = run(&mut inv, &config, &obs)?;
    assert_eq!(reports.second_pass.completed, vec!["target".to_string()]);

    let state = inv.state("target").ok_or_else(|| anyhow!("no state"))?;
    assert!((state.min_vf_criterion() - 0.01).abs() < 1e-12);
    assert_eq!(state.number_of_rays(), 3);

    let warnings = obs.events_at_least(EventLevel::Warning);
    assert!(warnings.iter().any(|e| matches!(e, FilterEvent::CriterionReplaced { .. })));
    assert!(warnings.iter().any(|e| matches!(e, FilterEvent::NumberOfRaysReplaced { .. })));
    assert!(warnings.iter().any(
        |e| matches!(e, FilterEvent::UnknownBuilding { building_id } if building_id == "ghost")
    ));
    Ok(())
}

#[test]
fn test_states_survive_json() -> Result<()> {
    let mut inv = block(Construction::window("glass", 0.08, 0.1))?;
    run(&mut inv, &target_config(), &RecordingObserver::new())?;
    let json = states_to_json(&inv)?;

    let mut restored = block(Construction::window("glass", 0.08, 0.1))?;
    assert_eq!(states_from_json(&mut restored, &json)?, 4);
    let state = restored.state("target").ok_or_else(|| anyhow!("no state"))?;
    assert!(state.second_pass_done());
    assert_eq!(state.context_shading_list().len(), 2);
    assert!(state.context_shading_list()[1].is_specular);
    assert_eq!(state.discarded_surfaces().map(|d| d.len()), Some(9));
    // Restored shades keep their offset geometry
    assert!((state.context_shading_list()[1].source_surface.centroid().x - 19.99).abs() < 1e-9);

    // Untouched buildings stay empty
    assert!(restored.state("east").is_some_and(|s| !s.first_pass_done()));
    Ok(())
}
