// scene/scene.rs
use glam::{Mat4, Quat};
use hecs::{Entity, World};

use super::components::{InstanceTransform, ModelRef, Name, RotateAnimation, Visible};
use super::model::{Model, ModelManager};
use crate::error::DrawError;
use crate::renderer::device::{GraphicsDevice, TextureId};
use crate::renderer::lighting::LightingSubsystem;

/// What a pass sees of one instance.
#[derive(Clone, Copy)]
pub struct SceneInstance<'a> {
    pub entity: Entity,
    pub world: Mat4,
    pub models: &'a ModelManager,
    pub model_index: usize,
    pub animation_tick: f32,
}

impl<'a> SceneInstance<'a> {
    pub fn model(&self) -> Result<&'a dyn Model, DrawError> {
        self.models
            .get(self.model_index)
            .ok_or(DrawError::MissingModel(self.model_index))
    }
}

/// Called once per visible instance by [`Scene::render`].
pub trait ScenePassRenderer {
    fn render_instance(
        &mut self,
        device: &mut dyn GraphicsDevice,
        instance: SceneInstance<'_>,
    ) -> Result<(), DrawError>;
}

/// Read-only view of the drawable part of a scene.
#[derive(Clone, Copy)]
pub struct SceneInstances<'a> {
    world: &'a World,
    models: &'a ModelManager,
    animation_tick: f32,
}

impl<'a> SceneInstances<'a> {
    /// Visits instances in entity order and stops at the first failure.
    pub fn render(
        &self,
        device: &mut dyn GraphicsDevice,
        renderer: &mut dyn ScenePassRenderer,
    ) -> Result<(), DrawError> {
        let mut query = self
            .world
            .query::<(&InstanceTransform, &ModelRef, Option<&Visible>)>();
        let mut instances = query
            .iter()
            .filter(|(_, (_, _, visible))| visible.map_or(true, |v| v.0))
            .map(|(entity, (transform, model, _))| (entity, transform.matrix(), model.0))
            .collect::<Vec<_>>();
        instances.sort_by_key(|(entity, _, _)| entity.id());

        for (entity, world, model_index) in instances {
            renderer.render_instance(
                device,
                SceneInstance {
                    entity,
                    world,
                    models: self.models,
                    model_index,
                    animation_tick: self.animation_tick,
                },
            )?;
        }
        Ok(())
    }

    pub fn models(&self) -> &'a ModelManager {
        self.models
    }

    pub fn animation_tick(&self) -> f32 {
        self.animation_tick
    }
}

pub struct Scene {
    world: World,
    models: ModelManager,
    lighting: Option<LightingSubsystem>,
    skybox: Option<TextureId>,
    time: f64,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    pub fn new() -> Self {
        Self {
            world: World::new(),
            models: ModelManager::new(),
            lighting: None,
            skybox: None,
            time: 0.0,
        }
    }

    pub fn with_lighting(mut self, lighting: LightingSubsystem) -> Self {
        self.lighting = Some(lighting);
        self
    }

    pub fn set_lighting(&mut self, lighting: LightingSubsystem) {
        self.lighting = Some(lighting);
    }

    pub fn lighting(&self) -> Option<&LightingSubsystem> {
        self.lighting.as_ref()
    }

    pub fn lighting_mut(&mut self) -> Option<&mut LightingSubsystem> {
        self.lighting.as_mut()
    }

    pub fn skybox(&self) -> Option<TextureId> {
        self.skybox
    }

    pub fn set_skybox(&mut self, texture: Option<TextureId>) {
        self.skybox = texture;
    }

    pub fn models(&self) -> &ModelManager {
        &self.models
    }

    pub fn models_mut(&mut self) -> &mut ModelManager {
        &mut self.models
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn spawn_instance(&mut self, model_index: usize, transform: InstanceTransform) -> Entity {
        self.world.spawn((transform, ModelRef(model_index)))
    }

    pub fn spawn_named(
        &mut self,
        name: impl Into<String>,
        model_index: usize,
        transform: InstanceTransform,
    ) -> Entity {
        self.world
            .spawn((Name::new(name), transform, ModelRef(model_index)))
    }

    pub fn set_visible(&mut self, entity: Entity, visible: bool) -> bool {
        self.world.insert_one(entity, Visible(visible)).is_ok()
    }

    pub fn instance_count(&self) -> u32 {
        self.world.len()
    }

    /// Seconds of animation time, handed to every draw.
    pub fn animation_tick(&self) -> f32 {
        self.time as f32
    }

    pub fn update(&mut self, dt: f64) {
        self.time += dt;
        self.system_rotate_animation(dt);
    }

    fn system_rotate_animation(&mut self, dt: f64) {
        for (_, (transform, anim)) in self
            .world
            .query_mut::<(&mut InstanceTransform, &RotateAnimation)>()
        {
            let rotation = Quat::from_axis_angle(anim.axis, anim.speed * dt as f32);
            transform.rotation = rotation * transform.rotation;
        }
    }

    pub fn instances(&self) -> SceneInstances<'_> {
        SceneInstances {
            world: &self.world,
            models: &self.models,
            animation_tick: self.animation_tick(),
        }
    }

    /// Lighting and the instance view as disjoint borrows, so the shadow
    /// pass can drive lighting while walking instances.
    pub fn split_for_frame(&mut self) -> (Option<&mut LightingSubsystem>, SceneInstances<'_>) {
        let animation_tick = self.animation_tick();
        (
            self.lighting.as_mut(),
            SceneInstances {
                world: &self.world,
                models: &self.models,
                animation_tick,
            },
        )
    }

    /// AND over every visible instance; the first failure ends the walk.
    pub fn render(
        &self,
        device: &mut dyn GraphicsDevice,
        renderer: &mut dyn ScenePassRenderer,
    ) -> Result<(), DrawError> {
        self.instances().render(device, renderer)
    }

    pub fn shutdown(&mut self, device: &mut dyn GraphicsDevice) {
        if let Some(lighting) = self.lighting.as_mut() {
            lighting.shutdown(device);
        }
    }
}
