//! The minimal scene surface the texture machinery consumes: containers of
//! texture resources, at the root or nested in assemblies. Scene-graph
//! construction proper lives elsewhere; once a store is built over a scene,
//! the scene is immutable.

use std::sync::Arc;

use texture::Texture;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct TextureId(pub u32);

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct AssemblyId(pub u32);

/// Id-stable collection of texture resources.
#[derive(Default)]
pub struct TextureContainer {
    textures: Vec<Arc<Texture>>,
}

impl TextureContainer {
    pub fn insert(&mut self, texture: Arc<Texture>) -> TextureId {
        let id = TextureId(self.textures.len() as u32);
        self.textures.push(texture);
        id
    }

    pub fn get(&self, id: TextureId) -> Option<&Arc<Texture>> {
        self.textures.get(id.0 as usize)
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }
}

/// A reusable sub-scene with its own textures and nested child assemblies.
pub struct Assembly {
    pub id: AssemblyId,
    pub textures: TextureContainer,
    pub assemblies: Vec<Arc<Assembly>>,
}

impl Assembly {
    pub fn new(id: AssemblyId) -> Assembly {
        Assembly {
            id,
            textures: TextureContainer::default(),
            assemblies: Vec::new(),
        }
    }
}

#[derive(Default)]
pub struct Scene {
    pub textures: TextureContainer,
    pub assemblies: Vec<Arc<Assembly>>,
}

impl Scene {
    pub fn new() -> Scene {
        Scene::default()
    }
}
