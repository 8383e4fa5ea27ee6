//! Built optical systems.

use std::collections::{BTreeMap, HashMap};

use optrain_math::{Dir3, Point3};
use optrain_surface::{
    AssemblySpec, MaterialCatalog, PlacedSurface, Surface, SurfaceFactory, SurfaceId, SurfaceSpec,
    WavelengthTable,
};
use optrain_trace::{HitCollector, Ray, RayLedger, SequentialTracer, TraceBatch, TracePath};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::settings::TraceSettings;

/// One entry of a system description, in optical-train order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Element {
    /// A standalone surface.
    Surface(PlacedSurface),
    /// A group of surfaces placed together.
    Assembly(AssemblySpec),
}

/// Declarative description of an optical system.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SystemSpec {
    /// Named templates surfaces may inherit from.
    #[serde(default)]
    pub templates: BTreeMap<String, SurfaceSpec>,
    /// Surfaces and assemblies in train order.
    #[serde(default)]
    pub elements: Vec<Element>,
}

impl SystemSpec {
    /// Empty description.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a template.
    pub fn template(mut self, name: impl Into<String>, spec: SurfaceSpec) -> Self {
        self.templates.insert(name.into(), spec);
        self
    }

    /// Append a surface.
    pub fn surface(mut self, surface: PlacedSurface) -> Self {
        self.elements.push(Element::Surface(surface));
        self
    }

    /// Append an assembly.
    pub fn assembly(mut self, assembly: AssemblySpec) -> Self {
        self.elements.push(Element::Assembly(assembly));
        self
    }

    /// Serialize to JSON string.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Deserialize from JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Hits on one target surface.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetHits {
    /// String id of the surface.
    pub surface: String,
    /// Numeric id of the surface.
    pub numeric_id: SurfaceId,
    /// World points of unblocked hits.
    pub points: Vec<Point3>,
    /// World normals at those points.
    pub normals: Vec<Dir3>,
}

/// Surfaces plus their resolved wavelength table, ready to trace.
///
/// Construction resolves every material up front; a system that exists can
/// only fail a trace on a wavelength it was not built for.
#[derive(Debug, Clone)]
pub struct OpticalSystem {
    surfaces: Vec<Surface>,
    table: WavelengthTable,
    settings: TraceSettings,
    by_id: HashMap<String, SurfaceId>,
}

impl OpticalSystem {
    /// Build every surface in order, then resolve materials at `wavelengths_nm`.
    pub fn build(
        spec: &SystemSpec,
        catalog: &dyn MaterialCatalog,
        wavelengths_nm: &[f64],
    ) -> Result<Self> {
        let mut factory = SurfaceFactory::new();
        for (name, template) in &spec.templates {
            factory.register_template(name.clone(), template.clone());
        }

        let mut surfaces = Vec::new();
        for element in &spec.elements {
            match element {
                Element::Surface(placed) => surfaces.push(factory.build_surface(placed)?),
                Element::Assembly(assembly) => surfaces.extend(factory.build_assembly(assembly)?),
            }
        }

        let table = WavelengthTable::build(&surfaces, wavelengths_nm, catalog)?;
        let by_id = surfaces
            .iter()
            .map(|s| (s.id().to_string(), s.numeric_id()))
            .collect();

        tracing::info!(
            surfaces = surfaces.len(),
            wavelengths = table.wavelengths().count(),
            "built optical system"
        );

        Ok(Self {
            surfaces,
            table,
            settings: TraceSettings::default(),
            by_id,
        })
    }

    /// Replace the trace settings.
    pub fn with_settings(mut self, settings: TraceSettings) -> Result<Self> {
        settings.validate()?;
        self.settings = settings;
        Ok(self)
    }

    /// Surfaces in train order.
    pub fn surfaces(&self) -> &[Surface] {
        &self.surfaces
    }

    /// Resolved refractive indices.
    pub fn table(&self) -> &WavelengthTable {
        &self.table
    }

    /// Active settings.
    pub fn settings(&self) -> &TraceSettings {
        &self.settings
    }

    /// Look up a surface by its string id.
    pub fn surface_by_id(&self, id: &str) -> Option<&Surface> {
        self.by_id.get(id).map(|n| &self.surfaces[n.index()])
    }

    fn require(&self, id: &str) -> Result<&Surface> {
        self.surface_by_id(id)
            .ok_or_else(|| Error::UnknownSurface(id.to_string()))
    }

    /// Tracer over this system's surfaces.
    pub fn tracer(&self) -> SequentialTracer<'_> {
        SequentialTracer::new(&self.surfaces, &self.table)
    }

    /// Trace one ray, recording into caller-owned state.
    ///
    /// A wavelength outside the table fails before `collector` or `ledger`
    /// is touched.
    pub fn trace(
        &self,
        ray: &Ray,
        collector: &mut HitCollector,
        ledger: &mut RayLedger,
    ) -> Result<TracePath> {
        let tracer = self.tracer();
        tracer.check_wavelengths(std::slice::from_ref(ray))?;
        Ok(tracer.trace(ray, collector, ledger)?)
    }

    /// Trace many rays, in parallel when the batch is large enough.
    ///
    /// Every wavelength is checked before the first ray is traced.
    pub fn trace_all(&self, rays: &[Ray]) -> Result<TraceBatch> {
        let tracer = self.tracer();
        tracer.check_wavelengths(rays)?;
        Ok(tracer.trace_all(rays, self.settings.use_parallel(rays.len()))?)
    }

    /// World aperture outline of a surface.
    pub fn boundary(&self, id: &str) -> Result<Vec<Point3>> {
        let surface = self.require(id)?;
        Ok(optrain_trace::boundary_polygon(
            surface,
            self.settings.circle_segments,
        ))
    }

    /// Trace `rays` and report unblocked hit points and normals on each target.
    ///
    /// Uses a fresh collector on every call, so repeated evaluations are
    /// independent.
    pub fn evaluate(&self, rays: &[Ray], targets: &[&str]) -> Result<Vec<TargetHits>> {
        let ids = targets
            .iter()
            .map(|&id| self.require(id).map(|s| (id, s.numeric_id())))
            .collect::<Result<Vec<_>>>()?;

        let batch = self.trace_all(rays)?;
        tracing::debug!(targets = ids.len(), hits = batch.collector.len(), "evaluated targets");
        Ok(ids
            .into_iter()
            .map(|(id, numeric_id)| {
                let (points, normals) = batch
                    .collector
                    .valid_for_surface(numeric_id)
                    .map(|r| (r.world_point, r.world_normal))
                    .unzip();
                TargetHits {
                    surface: id.to_string(),
                    numeric_id,
                    points,
                    normals,
                }
            })
            .collect())
    }
}
