//! Turn a traced sequence into a scene.

use glam::DVec3;
use lensmaker_core::{
    OpticalElement, OpticalSurface, Outline, RayBatch, Sampling, Scalar, Sequence,
    SimulationState, Transform, VectorN,
};

use crate::scene::{Group, Scene, SurfaceEntry};
use crate::theme::Theme;

/// Profile samples drawn per surface.
pub const SURFACE_SAMPLES: usize = 100;

fn coords(p: DVec3, dim: usize) -> Vec<f64> {
    p.to_array()[..dim].to_vec()
}

fn segment(start: DVec3, end: DVec3, dim: usize) -> Vec<f64> {
    let mut row = coords(start, dim);
    row.extend(coords(end, dim));
    row
}

/// Rays from their origin until they reach the abscissa `end_x`.
fn rays_until<S: Scalar>(rays: &RayBatch<S>, end_x: f64, color: &str) -> Group {
    let dim = rays.dim();
    let data = rays
        .points()
        .iter()
        .zip(rays.vectors())
        .map(|(p, v)| {
            let (p, v) = (p.to_dvec3(), v.to_dvec3());
            let t = (end_x - p.x) / v.x;
            segment(p, p + v * t, dim)
        })
        .collect();
    Group::Rays {
        data,
        color: color.to_string(),
    }
}

/// Rays drawn with a fixed length.
fn rays_length<S: Scalar>(rays: &RayBatch<S>, length: f64, color: &str) -> Group {
    let dim = rays.dim();
    let data = rays
        .points()
        .iter()
        .zip(rays.vectors())
        .map(|(p, v)| {
            let p = p.to_dvec3();
            segment(p, p + v.to_dvec3() * length, dim)
        })
        .collect();
    Group::Rays {
        data,
        color: color.to_string(),
    }
}

/// Segments from each start point to the matching end point.
fn rays_between<S: Scalar>(
    starts: &[VectorN<S>],
    ends: &[VectorN<S>],
    dim: usize,
    color: &str,
) -> Group {
    let data = starts
        .iter()
        .zip(ends)
        .map(|(a, b)| segment(a.to_dvec3(), b.to_dvec3(), dim))
        .collect();
    Group::Rays {
        data,
        color: color.to_string(),
    }
}

fn render_joint<S: Scalar>(inputs: &SimulationState<S>, theme: &Theme) -> Group {
    Group::Points {
        data: vec![coords(inputs.target().to_dvec3(), inputs.dim())],
        color: theme.joint.clone(),
    }
}

fn render_surface<S: Scalar>(element: &OpticalSurface<S>, placement: &Transform<S>) -> Group {
    let surface = element.surface();
    let samples = surface
        .samples_2d(SURFACE_SAMPLES)
        .iter()
        .map(|s| [s.x().value(), s.get(1).value()])
        .collect();
    let side_length = match *surface.outline() {
        Outline::Square { side_length } => Some(side_length),
        Outline::Circular { .. } => None,
    };

    Group::Surfaces {
        data: vec![SurfaceEntry::new(placement.to_dmat4(), samples, side_length)],
    }
}

/// Valid rays up to their collision point, blocked rays up to the surface
/// plane.
fn render_surface_rays<S: Scalar>(
    placement: &Transform<S>,
    inputs: &SimulationState<S>,
    outputs: &SimulationState<S>,
    theme: &Theme,
) -> Vec<Group> {
    let dim = inputs.dim();
    let Some(blocked) = outputs.blocked() else {
        return vec![rays_between(
            inputs.rays().points(),
            outputs.rays().points(),
            dim,
            &theme.valid,
        )];
    };

    let mut groups = Vec::with_capacity(2);

    let valid: Vec<bool> = blocked.iter().map(|&b| !b).collect();
    let hits = inputs.rays().select(&valid);
    if !hits.is_empty() {
        groups.push(rays_between(
            hits.points(),
            outputs.rays().points(),
            dim,
            &theme.valid,
        ));
    }

    let missed = inputs.rays().select(blocked);
    if !missed.is_empty() {
        let surface_x = placement.direct_point(&VectorN::zeros(dim)).x().value();
        groups.push(rays_until(&missed, surface_x, &theme.blocked));
    }

    groups
}

/// Trace `sequence` and draw every step.
///
/// Each element gets its chain joint; surfaces also get their shape and the
/// rays that reached them. Output rays are drawn with length `end` when
/// given.
pub fn render_sequence<S: Scalar>(
    sequence: &Sequence<S>,
    sampling: Sampling,
    end: Option<f64>,
    theme: &Theme,
) -> Scene {
    let dim = sampling.dim;
    let (output, steps) = sequence.full_forward(SimulationState::new(sampling));
    let mut scene = Scene::new(dim);

    for step in &steps {
        scene.push(render_joint(&step.inputs, theme));

        if let OpticalElement::Surface(element) = step.element {
            let placement = element.placement(&step.inputs);
            scene.push(render_surface(element, &placement));

            if !step.inputs.rays().is_empty() {
                for group in render_surface_rays(&placement, &step.inputs, &step.outputs, theme) {
                    scene.push(group);
                }
            }
        }
    }

    if let Some(length) = end {
        scene.push(rays_length(output.rays(), length, &theme.valid));
    }

    log::debug!(
        "rendered {} steps into {} groups",
        steps.len(),
        scene.data.len()
    );
    scene
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::SceneMode;
    use lensmaker_core::{Gap, Plane, PointSourceAtInfinity, Sphere};

    fn rays_data(group: &Group) -> &Vec<Vec<f64>> {
        match group {
            Group::Rays { data, .. } => data,
            other => panic!("expected rays, got {other:?}"),
        }
    }

    #[test]
    fn test_render_simple_lens() {
        let mut seq = Sequence::<f64>::default();
        seq.push(PointSourceAtInfinity::new(8.0).unwrap());
        seq.push(Gap::new(10.0).unwrap());
        seq.push(OpticalSurface::new(Sphere::new(10.0, 25.0).unwrap()));
        seq.push(Gap::new(5.0).unwrap());

        let scene = render_sequence(&seq, Sampling::for_view(2), Some(20.0), &Theme::default());

        assert_eq!(scene.mode, SceneMode::TwoD);
        assert_eq!(scene.count("points"), 4);
        assert_eq!(scene.count("surfaces"), 1);
        // Rays into the surface plus the final rays
        assert_eq!(scene.count("rays"), 2);

        let last = rays_data(scene.data.last().unwrap());
        assert_eq!(last.len(), 10);
        for row in last {
            assert_eq!(row.len(), 4);
            assert!((row[2] - row[0] - 20.0).abs() < 1.0);
        }

        let json = scene.to_json().unwrap();
        assert!(json.contains("\"mode\":\"2D\""));
    }

    #[test]
    fn test_blocked_rays_stop_at_surface_plane() {
        let mut seq = Sequence::<f64>::default();
        seq.push(PointSourceAtInfinity::new(10.0).unwrap());
        seq.push(Gap::new(4.0).unwrap());
        seq.push(OpticalSurface::new(Plane::square(5.0).unwrap()));

        let theme = Theme::default();
        let scene = render_sequence(&seq, Sampling::for_view(3), None, &theme);
        assert_eq!(scene.mode, SceneMode::ThreeD);

        let surfaces: Vec<&SurfaceEntry> = scene
            .data
            .iter()
            .filter_map(|g| match g {
                Group::Surfaces { data } => Some(&data[0]),
                _ => None,
            })
            .collect();
        assert_eq!(surfaces[0].side_length, Some(5.0));
        assert_eq!(surfaces[0].matrix[0][3], 4.0);
        assert_eq!(surfaces[0].samples.len(), SURFACE_SAMPLES);

        let blocked = scene
            .data
            .iter()
            .find(|g| matches!(g, Group::Rays { color, .. } if *color == theme.blocked))
            .unwrap();
        for row in rays_data(blocked) {
            assert_eq!(row.len(), 6);
            assert!((row[3] - 4.0).abs() < 1e-12);
        }
    }
}
