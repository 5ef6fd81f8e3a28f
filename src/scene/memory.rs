use std::collections::BTreeMap;

use log::trace;

use super::scene::{LineSpec, MarkerHandle, MarkerSpec, Scene, SceneError};

#[derive(Clone, Debug, PartialEq)]
pub enum SceneObject {
    Marker { spec: MarkerSpec, scale: f32 },
    Line(LineSpec),
}

/// Headless scene graph: keeps every live object in memory.
///
/// Used by the `globe_viewer` binary when no renderer is attached and by
/// tests to check that nothing leaks across refreshes.
#[derive(Debug, Default)]
pub struct MemoryScene {
    objects: BTreeMap<MarkerHandle, SceneObject>,
    next_id: u64,
    disposed: u64,
    /// Names whose creation should fail.
    #[cfg(test)]
    fail_names: Vec<String>,
}

impl MemoryScene {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub(crate) fn fail_on(&mut self, name: impl Into<String>) {
        self.fail_names.push(name.into());
    }

    #[cfg(test)]
    pub(crate) fn clear_failures(&mut self) {
        self.fail_names.clear();
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn get(&self, handle: MarkerHandle) -> Option<&SceneObject> {
        self.objects.get(&handle)
    }

    pub fn disposed_count(&self) -> u64 {
        self.disposed
    }

    pub fn markers(&self) -> impl Iterator<Item = (MarkerHandle, &MarkerSpec)> {
        self.objects.iter().filter_map(|(h, obj)| match obj {
            SceneObject::Marker { spec, .. } => Some((*h, spec)),
            SceneObject::Line(_) => None,
        })
    }

    pub fn lines(&self) -> impl Iterator<Item = (MarkerHandle, &LineSpec)> {
        self.objects.iter().filter_map(|(h, obj)| match obj {
            SceneObject::Line(spec) => Some((*h, spec)),
            SceneObject::Marker { .. } => None,
        })
    }

    pub fn scale_of(&self, handle: MarkerHandle) -> Option<f32> {
        match self.objects.get(&handle) {
            Some(SceneObject::Marker { scale, .. }) => Some(*scale),
            _ => None,
        }
    }

    #[cfg(not(test))]
    fn check(&self, _kind: &'static str, _name: &str) -> Result<(), SceneError> {
        Ok(())
    }

    #[cfg(test)]
    fn check(&self, kind: &'static str, name: &str) -> Result<(), SceneError> {
        if self.fail_names.iter().any(|n| n == name) {
            return Err(SceneError::Create {
                kind,
                name: name.to_string(),
                reason: "rejected by scene".into(),
            });
        }
        Ok(())
    }

    fn insert(&mut self, object: SceneObject) -> MarkerHandle {
        let handle = MarkerHandle(self.next_id);
        self.next_id += 1;
        self.objects.insert(handle, object);
        handle
    }
}

impl Scene for MemoryScene {
    fn create_marker(&mut self, spec: MarkerSpec) -> Result<MarkerHandle, SceneError> {
        self.check("marker", &spec.name)?;
        trace!("create marker {} at {:?}", spec.name, spec.position.as_array());
        Ok(self.insert(SceneObject::Marker { spec, scale: 1.0 }))
    }

    fn create_line(&mut self, spec: LineSpec) -> Result<MarkerHandle, SceneError> {
        self.check("line", &spec.name)?;
        trace!("create line {}", spec.name);
        Ok(self.insert(SceneObject::Line(spec)))
    }

    fn dispose(&mut self, handle: MarkerHandle) -> Result<(), SceneError> {
        self.objects
            .remove(&handle)
            .ok_or(SceneError::UnknownHandle(handle))?;
        self.disposed += 1;
        Ok(())
    }

    fn set_scale(&mut self, handle: MarkerHandle, scale: f32) -> Result<(), SceneError> {
        match self.objects.get_mut(&handle) {
            Some(SceneObject::Marker { scale: s, .. }) => {
                *s = scale;
                Ok(())
            }
            _ => Err(SceneError::UnknownHandle(handle)),
        }
    }
}
