//! The compiled object model: packages owning classifiers owning structural
//! features, stored in per-kind arenas and addressed through typed [`Ref`]s.
//!
//! Records are created once and never deleted; the only mutation after
//! creation is membership addition (classifiers into packages, features into
//! classifiers) and the alias-name overlays applied by the resolver. The
//! whole model is owned by one compilation session and released with it.

use std::fmt;
use std::hash::Hash;
use std::marker::PhantomData;
use std::num::{NonZeroU32, NonZeroUsize};

/// Trait implemented by all records stored in the [`Metamodel`] arenas.
pub trait ModelComponent {
    const DISPLAY_NAME: &'static str;
}

/// Type on which the internal arena-access traits are implemented, to keep
/// them out of [`ModelComponent`]'s public surface.
pub struct ModelTraits;

pub trait HasArenaContainer<R: ModelComponent>: Sized {
    fn container(model: &Metamodel) -> &[R];
    fn container_mut(model: &mut Metamodel) -> &mut Vec<R>;
}

/// A reference to a record stored in a [`Metamodel`] arena.
pub struct Ref<R>(NonZeroU32, PhantomData<R>)
where
    R: ModelComponent,
    ModelTraits: HasArenaContainer<R>;

impl<R> Ref<R>
where
    R: ModelComponent,
    ModelTraits: HasArenaContainer<R>,
{
    const fn from_inner(inner: NonZeroU32) -> Self {
        Self(inner, PhantomData)
    }

    fn index(self) -> usize {
        let size: NonZeroUsize = self
            .0
            .try_into()
            .expect("Could not convert model reference to usize index");
        usize::from(size) - 1
    }

    pub fn get(self, model: &Metamodel) -> &R {
        model.get(self)
    }
}

// derive(...) does not work if R itself does not derive the trait, even though
// it is only "used" in the PhantomData; hence the manual implementations.

impl<R> Copy for Ref<R>
where
    R: ModelComponent,
    ModelTraits: HasArenaContainer<R>,
{
}

impl<R> Clone for Ref<R>
where
    R: ModelComponent,
    ModelTraits: HasArenaContainer<R>,
{
    fn clone(&self) -> Self {
        *self
    }
}

impl<R> fmt::Debug for Ref<R>
where
    R: ModelComponent,
    ModelTraits: HasArenaContainer<R>,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "<{} #{}>", R::DISPLAY_NAME, self.0)
    }
}

impl<R> PartialEq for Ref<R>
where
    R: ModelComponent,
    ModelTraits: HasArenaContainer<R>,
{
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl<R> Eq for Ref<R>
where
    R: ModelComponent,
    ModelTraits: HasArenaContainer<R>,
{
}

impl<R> Hash for Ref<R>
where
    R: ModelComponent,
    ModelTraits: HasArenaContainer<R>,
{
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

/// Arena storage for the compiled model.
#[derive(Default)]
pub struct Metamodel {
    packages: Vec<Package>,
    classifiers: Vec<Classifier>,
    features: Vec<StructuralFeature>,
}

impl Metamodel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get<R>(&self, ref_: Ref<R>) -> &R
    where
        R: ModelComponent,
        ModelTraits: HasArenaContainer<R>,
    {
        ModelTraits::container(self)
            .get(ref_.index())
            .expect("Invalid model reference (out-of-bounds)")
    }

    pub fn get_mut<R>(&mut self, ref_: Ref<R>) -> &mut R
    where
        R: ModelComponent,
        ModelTraits: HasArenaContainer<R>,
    {
        let index = ref_.index();
        ModelTraits::container_mut(self)
            .get_mut(index)
            .expect("Invalid model reference (out-of-bounds)")
    }

    pub fn create<R>(&mut self, value: R) -> Ref<R>
    where
        R: ModelComponent,
        ModelTraits: HasArenaContainer<R>,
    {
        let container = ModelTraits::container_mut(self);
        container.push(value);

        // The new size is used for the ref's ID, which is non-zero after the push.
        let size = NonZeroUsize::new(container.len()).unwrap();
        let id: NonZeroU32 = size.try_into().expect("ID did not fit into 32-bit integer");
        Ref::from_inner(id)
    }

    pub fn packages(&self) -> impl Iterator<Item = (Ref<Package>, &Package)> {
        self.packages.iter().enumerate().map(|(index, package)| {
            let id = NonZeroU32::new(index as u32 + 1).unwrap();
            (Ref::from_inner(id), package)
        })
    }

    /// Adds a classifier to the model and to its owning package's membership.
    pub fn add_classifier(&mut self, classifier: Classifier) -> Ref<Classifier> {
        let package = classifier.package;
        let ref_ = self.create(classifier);
        self.get_mut(package).classifiers.push(ref_);
        ref_
    }

    /// Adds a feature to the model and to its owning classifier's membership.
    pub fn add_feature(
        &mut self,
        owner: Ref<Classifier>,
        feature: StructuralFeature,
    ) -> Ref<StructuralFeature> {
        let ref_ = self.create(feature);
        self.get_mut(owner).features.push(ref_);
        ref_
    }

    /// Looks up a classifier by name within a package's membership.
    pub fn classifier_in_package(
        &self,
        package: Ref<Package>,
        name: &str,
    ) -> Option<Ref<Classifier>> {
        self.get(package)
            .classifiers
            .iter()
            .copied()
            .find(|&classifier| self.get(classifier).name == name)
    }
}

macro_rules! has_arena_container_impl {
    ($type_name:ty, $field_name:ident) => {
        impl HasArenaContainer<$type_name> for ModelTraits {
            fn container(model: &Metamodel) -> &[$type_name] {
                &model.$field_name
            }

            fn container_mut(model: &mut Metamodel) -> &mut Vec<$type_name> {
                &mut model.$field_name
            }
        }
    };
}

has_arena_container_impl!(Package, packages);
has_arena_container_impl!(Classifier, classifiers);
has_arena_container_impl!(StructuralFeature, features);

/// The compiled grouping container for classifiers, named after its namespace.
#[derive(Clone, Debug)]
pub struct Package {
    pub name: String,
    pub namespace_uri: Option<String>,
    pub ns_prefix: String,
    /// Whether members of this package are namespace-qualified in instance
    /// documents. False only for packages compiled from a schema without a
    /// target namespace.
    pub qualified: bool,
    pub classifiers: Vec<Ref<Classifier>>,
}

impl ModelComponent for Package {
    const DISPLAY_NAME: &'static str = "Package";
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ClassifierKind {
    /// Class-like: carries structural features.
    Class,
    /// Datatype-like: a plain value type with an instance-class binding.
    DataType,
}

/// A compiled class-like or datatype-like type.
#[derive(Clone, Debug)]
pub struct Classifier {
    pub name: String,
    pub package: Ref<Package>,
    pub kind: ClassifierKind,
    pub alias_names: Vec<String>,
    pub instance_class: Option<String>,
    pub is_builtin: bool,
    pub features: Vec<Ref<StructuralFeature>>,
}

impl Classifier {
    pub fn new(name: impl Into<String>, package: Ref<Package>, kind: ClassifierKind) -> Self {
        Self {
            name: name.into(),
            package,
            kind,
            alias_names: Vec::new(),
            instance_class: None,
            is_builtin: false,
            features: Vec::new(),
        }
    }
}

impl ModelComponent for Classifier {
    const DISPLAY_NAME: &'static str = "Classifier";
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MaxOccurs {
    Count(u32),
    Unbounded,
}

/// A named, typed property of a classifier with occurrence bounds.
#[derive(Clone, Debug)]
pub struct StructuralFeature {
    /// Always exactly the source identifier; never case-mangled.
    pub name: String,
    pub classifier_type: Option<Ref<Classifier>>,
    pub min_occurs: u32,
    pub max_occurs: MaxOccurs,
    pub alias_names: Vec<String>,
    pub read_only: bool,
    pub opposite: Option<String>,
    pub sequenced: bool,
}

impl ModelComponent for StructuralFeature {
    const DISPLAY_NAME: &'static str = "StructuralFeature";
}
