use glam::Vec3;
use orbis_planet::{
    GeneratedPlanet, MeshingOptions, NoiseMapping, PlanetDescriptor, PlanetGenerator,
    TriangulationMode,
};
use orbis_terrain::DensitySampler;

fn generate(descriptor: PlanetDescriptor, workers: usize) -> GeneratedPlanet {
    PlanetGenerator::new(descriptor)
        .with_workers(workers)
        .generate()
        .unwrap()
}

fn noisy_planet() -> PlanetDescriptor {
    PlanetDescriptor {
        radius: 14.0,
        resolution: 24,
        world_size: 48.0,
        noise_octaves: 4,
        terrain_height_scale: 3.0,
        seed: 1234,
        world_center: Vec3::new(-8.0, 30.0, 2.5),
        ..Default::default()
    }
}

fn position_bits(planet: &GeneratedPlanet) -> Vec<[u32; 3]> {
    planet
        .mesh
        .vertices
        .iter()
        .map(|v| v.to_array().map(f32::to_bits))
        .collect()
}

/// Every triangle normal points away from the planet center.
fn assert_faces_away_from(planet: &GeneratedPlanet, tolerance: f32) {
    let center = planet.info.center;
    let mesh = &planet.mesh;
    for (tri, normals) in mesh.triangles().zip(mesh.normals.chunks_exact(3)) {
        let centroid = (tri[0] + tri[1] + tri[2]) / 3.0;
        let dot = normals[0].dot(centroid - center);
        assert!(dot >= -tolerance, "Triangle at {centroid} faces inward ({dot})");
    }
}

#[test]
fn test_generation_is_deterministic() {
    let a = generate(noisy_planet(), 1);
    let b = generate(noisy_planet(), 1);
    assert_eq!(position_bits(&a), position_bits(&b));
    assert_eq!(a.mesh.indices, b.mesh.indices);
    assert_eq!(a, b);
}

#[test]
fn test_worker_count_does_not_change_output() {
    let serial = generate(noisy_planet(), 1);
    for workers in [2, 5, 16] {
        let parallel = generate(noisy_planet(), workers);
        assert_eq!(
            position_bits(&serial),
            position_bits(&parallel),
            "Vertices differ with {workers} workers"
        );
        assert_eq!(serial, parallel, "Mesh differs with {workers} workers");
    }
}

#[test]
fn test_seed_changes_terrain() {
    let a = generate(noisy_planet(), 4);
    let b = generate(
        PlanetDescriptor {
            seed: 4321,
            ..noisy_planet()
        },
        4,
    );
    assert_ne!(a.mesh, b.mesh);
}

#[test]
fn test_smooth_sphere_stays_within_a_voxel() {
    let descriptor = PlanetDescriptor {
        terrain_height_scale: 0.0,
        ..noisy_planet()
    };
    let diagonal = descriptor.voxel_size() * 3f32.sqrt();
    for mode in [
        TriangulationMode::Fan,
        TriangulationMode::Quad,
        TriangulationMode::FanAndQuad,
        TriangulationMode::MarchingCubes,
    ] {
        let planet = PlanetGenerator::new(descriptor.clone())
            .with_meshing(MeshingOptions {
                mode,
                ..Default::default()
            })
            .with_workers(3)
            .generate()
            .unwrap();
        assert!(!planet.mesh.is_empty(), "{mode:?} produced no triangles");
        for vertex in &planet.mesh.vertices {
            let altitude = planet.info.altitude_of(*vertex);
            assert!(
                altitude.abs() <= diagonal + 1e-3,
                "{mode:?} vertex {vertex} is {altitude} from the surface"
            );
        }
    }
}

#[test]
fn test_mesh_is_well_formed() {
    for mapping in [NoiseMapping::Spherical, NoiseMapping::Planar] {
        let planet = generate(
            PlanetDescriptor {
                noise_mapping: mapping,
                ..noisy_planet()
            },
            4,
        );
        let mesh = &planet.mesh;
        assert!(!mesh.is_empty());
        assert!(mesh.is_well_formed(), "{mapping:?} mesh is malformed");
        assert_eq!(mesh.normals.len(), mesh.vertices.len());
        assert_eq!(mesh.indices.len() % 3, 0);
        assert!(
            mesh.indices.iter().all(|&i| (i as usize) < mesh.vertices.len()),
            "{mapping:?} mesh has an out-of-range index"
        );
    }
}

#[test]
fn test_triangles_face_outward() {
    for mode in [
        TriangulationMode::Fan,
        TriangulationMode::Quad,
        TriangulationMode::MarchingCubes,
    ] {
        let planet = PlanetGenerator::new(noisy_planet())
            .with_meshing(MeshingOptions {
                mode,
                ..Default::default()
            })
            .with_workers(4)
            .generate()
            .unwrap();
        assert!(!planet.mesh.is_empty(), "{mode:?} produced no triangles");
        assert_faces_away_from(&planet, 1e-3);
    }
}

#[test]
fn test_uniform_volumes_yield_empty_mesh() {
    for radius in [0.0, 1000.0] {
        let planet = generate(
            PlanetDescriptor {
                radius,
                terrain_height_scale: 0.0,
                ..noisy_planet()
            },
            2,
        );
        assert!(planet.mesh.is_empty(), "Radius {radius} produced triangles");
        assert_eq!(planet.stats.surface_cubes, 0);
        assert_eq!(planet.stats.cubes, 23 * 23 * 23);
    }
}

#[test]
fn test_density_at_center_is_radius() {
    let descriptor = noisy_planet();
    let sampler = DensitySampler::new(&descriptor).unwrap();
    assert_eq!(sampler.density_at(descriptor.field_center()), descriptor.radius);
}

#[test]
fn test_coarse_grid_scenario() {
    let planet = generate(
        PlanetDescriptor {
            radius: 10.0,
            resolution: 4,
            world_size: 40.0,
            noise_octaves: 0,
            ..Default::default()
        },
        1,
    );
    // Ten-unit voxels against a radius of 10 still cross the sphere.
    assert!(!planet.mesh.is_empty());
    assert_eq!(planet.mesh.triangle_count(), 24);
    assert!(planet.mesh.is_well_formed());
    for vertex in &planet.mesh.vertices {
        let r = vertex.distance(planet.info.center);
        assert!((0.0..=20.0).contains(&r), "Vertex at distance {r}");
    }
    assert_faces_away_from(&planet, 1e-4);
}

#[test]
fn test_minimum_resolution_runs() {
    let planet = generate(
        PlanetDescriptor {
            resolution: 2,
            ..Default::default()
        },
        8,
    );
    assert!(planet.mesh.is_well_formed());
    assert_eq!(planet.stats.cubes, 1);
}

