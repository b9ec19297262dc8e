//! JSON description of an optical stack.

use std::path::Path;

use anyhow::{ensure, Context, Result};
use lensmaker_core::{
    Anchor, CircularArc, CriticalAnglePolicy, Gap, Interaction, NewtonConfig, OpticalElement,
    OpticalSurface, Parabola, Plane, PointSourceAtInfinity, Sampling, Sequence, Sphere, Surface,
    TraceResult, DEFAULT_MARGIN,
};
use lensmaker_view::Theme;
use serde::Deserialize;

/// Top-level stack file.
#[derive(Debug, Deserialize)]
pub struct StackConfig {
    #[serde(default)]
    pub sampling: SamplingConfig,
    /// Length of the output rays in the exported scene
    #[serde(default)]
    pub end: Option<f64>,
    #[serde(default)]
    pub theme: Theme,
    pub elements: Vec<ElementConfig>,
}

#[derive(Debug, Deserialize)]
pub struct SamplingConfig {
    #[serde(default = "default_dim")]
    pub dim: usize,
    #[serde(default = "default_base")]
    pub base: usize,
}

fn default_dim() -> usize {
    2
}

fn default_base() -> usize {
    10
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            dim: default_dim(),
            base: default_base(),
        }
    }
}

impl SamplingConfig {
    pub fn to_sampling(&self) -> Result<Sampling> {
        ensure!(
            self.dim == 2 || self.dim == 3,
            "sampling dimension must be 2 or 3, got {}",
            self.dim
        );
        ensure!(self.base > 0, "sampling base must be at least 1");
        Ok(Sampling::new::<f64>(self.dim, self.base))
    }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ElementConfig {
    Source {
        beam_diameter: f64,
        #[serde(default)]
        angle1: f64,
        #[serde(default)]
        angle2: f64,
        #[serde(default = "default_margin")]
        margin: f64,
    },
    Gap {
        offset: f64,
    },
    Surface {
        shape: ShapeConfig,
        #[serde(default = "default_scale")]
        scale: f64,
        #[serde(default)]
        anchors: [AnchorConfig; 2],
        #[serde(default)]
        interaction: InteractionConfig,
        #[serde(default)]
        newton_iterations: Option<usize>,
    },
}

fn default_margin() -> f64 {
    DEFAULT_MARGIN
}

fn default_scale() -> f64 {
    1.0
}

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ShapeConfig {
    Plane { diameter: f64 },
    SquarePlane { side_length: f64 },
    Sphere { diameter: f64, radius: f64 },
    Parabola { diameter: f64, a: f64 },
    CircularArc { diameter: f64, radius: f64 },
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnchorConfig {
    #[default]
    Origin,
    Extent,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyConfig {
    Nan,
    #[default]
    Clamp,
    Drop,
    Reflect,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum InteractionConfig {
    Refraction {
        #[serde(default = "default_n1")]
        n1: f64,
        #[serde(default = "default_n2")]
        n2: f64,
        #[serde(default)]
        policy: PolicyConfig,
    },
    Reflection,
}

fn default_n1() -> f64 {
    1.0
}

fn default_n2() -> f64 {
    1.5
}

impl Default for InteractionConfig {
    fn default() -> Self {
        InteractionConfig::Refraction {
            n1: default_n1(),
            n2: default_n2(),
            policy: PolicyConfig::default(),
        }
    }
}

impl From<AnchorConfig> for Anchor {
    fn from(anchor: AnchorConfig) -> Self {
        match anchor {
            AnchorConfig::Origin => Anchor::Origin,
            AnchorConfig::Extent => Anchor::Extent,
        }
    }
}

impl From<PolicyConfig> for CriticalAnglePolicy {
    fn from(policy: PolicyConfig) -> Self {
        match policy {
            PolicyConfig::Nan => CriticalAnglePolicy::Nan,
            PolicyConfig::Clamp => CriticalAnglePolicy::Clamp,
            PolicyConfig::Drop => CriticalAnglePolicy::Drop,
            PolicyConfig::Reflect => CriticalAnglePolicy::Reflect,
        }
    }
}

impl From<&InteractionConfig> for Interaction<f64> {
    fn from(interaction: &InteractionConfig) -> Self {
        match *interaction {
            InteractionConfig::Refraction { n1, n2, policy } => Interaction::Refraction {
                n1,
                n2,
                policy: policy.into(),
            },
            InteractionConfig::Reflection => Interaction::Reflection,
        }
    }
}

impl ShapeConfig {
    pub fn build(&self) -> TraceResult<Surface<f64>> {
        Ok(match *self {
            ShapeConfig::Plane { diameter } => Plane::circular(diameter)?.into(),
            ShapeConfig::SquarePlane { side_length } => Plane::square(side_length)?.into(),
            ShapeConfig::Sphere { diameter, radius } => Sphere::new(diameter, radius)?.into(),
            ShapeConfig::Parabola { diameter, a } => Parabola::new(diameter, a)?.into(),
            ShapeConfig::CircularArc { diameter, radius } => {
                CircularArc::new(diameter, radius)?.into()
            }
        })
    }
}

impl ElementConfig {
    pub fn build(&self) -> TraceResult<OpticalElement<f64>> {
        Ok(match self {
            ElementConfig::Source {
                beam_diameter,
                angle1,
                angle2,
                margin,
            } => PointSourceAtInfinity::new(*beam_diameter)?
                .with_angles(*angle1, *angle2)?
                .with_margin(*margin)?
                .into(),
            ElementConfig::Gap { offset } => Gap::new(*offset)?.into(),
            ElementConfig::Surface {
                shape,
                scale,
                anchors,
                interaction,
                newton_iterations,
            } => {
                let mut newton = NewtonConfig::default();
                if let Some(iterations) = newton_iterations {
                    newton.iterations = *iterations;
                }
                OpticalSurface::new(shape.build()?)
                    .with_scale(*scale)?
                    .with_anchors(anchors[0].into(), anchors[1].into())
                    .with_interaction(interaction.into())?
                    .with_newton(newton)
                    .into()
            }
        })
    }
}

impl StackConfig {
    pub fn parse(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Build the sequence. The first invalid element aborts.
    pub fn build_sequence(&self) -> Result<Sequence<f64>> {
        let elements = self
            .elements
            .iter()
            .enumerate()
            .map(|(i, element)| {
                element
                    .build()
                    .with_context(|| format!("element {i} is invalid"))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Sequence::new(elements))
    }
}

/// Load a stack description from a JSON file.
pub fn load_config(path: &Path) -> Result<StackConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    StackConfig::parse(&content).with_context(|| format!("failed to parse {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const LENS: &str = r#"{
        "sampling": { "dim": 2, "base": 5 },
        "end": 40.0,
        "elements": [
            { "type": "source", "beam_diameter": 10.0 },
            { "type": "gap", "offset": 5.0 },
            {
                "type": "surface",
                "shape": { "kind": "sphere", "diameter": 15.0, "radius": 30.0 },
                "anchors": ["origin", "extent"]
            },
            { "type": "gap", "offset": 2.0 },
            {
                "type": "surface",
                "shape": { "kind": "sphere", "diameter": 15.0, "radius": -30.0 },
                "anchors": ["extent", "origin"],
                "interaction": { "mode": "refraction", "n1": 1.5, "n2": 1.0, "policy": "drop" }
            }
        ]
    }"#;

    #[test]
    fn test_parse_and_build() {
        let config = StackConfig::parse(LENS).unwrap();
        assert_eq!(config.sampling.base, 5);
        assert_eq!(config.end, Some(40.0));
        assert_eq!(config.theme, Theme::default());

        let sequence = config.build_sequence().unwrap();
        assert_eq!(sequence.len(), 5);
        match &sequence.elements()[4] {
            OpticalElement::Surface(surface) => {
                assert_eq!(surface.anchors(), (Anchor::Extent, Anchor::Origin));
                assert_eq!(
                    surface.interaction(),
                    &Interaction::Refraction {
                        n1: 1.5,
                        n2: 1.0,
                        policy: CriticalAnglePolicy::Drop
                    }
                );
            }
            other => panic!("expected a surface, got {other:?}"),
        }

        let output = sequence.trace(config.sampling.to_sampling().unwrap());
        assert_eq!(output.rays().len(), 5);
    }

    #[test]
    fn test_invalid_element_is_reported() {
        let json = r#"{ "elements": [
            { "type": "surface", "shape": { "kind": "sphere", "diameter": 10.0, "radius": 2.0 } }
        ] }"#;
        let err = StackConfig::parse(json).unwrap().build_sequence().unwrap_err();
        assert_eq!(err.to_string(), "element 0 is invalid");
        assert!(format!("{err:#}").contains("twice its radius of curvature"));
    }

    #[test]
    fn test_zero_refractive_index_is_rejected() {
        let json = r#"{ "elements": [
            {
                "type": "surface",
                "shape": { "kind": "plane", "diameter": 10.0 },
                "interaction": { "mode": "refraction", "n1": 1.0, "n2": 0.0 }
            }
        ] }"#;
        let err = StackConfig::parse(json).unwrap().build_sequence().unwrap_err();
        assert_eq!(err.to_string(), "element 0 is invalid");
        assert!(format!("{err:#}").contains("n2"));
    }

    #[test]
    fn test_unknown_type_fails_to_parse() {
        assert!(StackConfig::parse(r#"{ "elements": [{ "type": "prism" }] }"#).is_err());
    }

    #[test]
    fn test_bad_dimension() {
        let config = SamplingConfig { dim: 4, base: 3 };
        assert!(config.to_sampling().is_err());
    }
}
