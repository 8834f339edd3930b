#![forbid(unsafe_code)]

//! Presentation items: the entries of a modal stack.
//!
//! A [`PresentationItem`] is built at present time from a [`Route`] or a
//! coordinator's root content, lives while it sits on the modal stack, and
//! is destroyed (its slot cleared) on dismissal. It is exclusively owned by
//! the [`ModalStackCoordinator`](crate::ModalStackCoordinator) holding it.
//!
//! The content capability returns `Option<V>`: items built from a
//! coordinator capture the flow weakly, so a layer whose owner has already
//! been torn down resolves to `None` while its teardown animation plays
//! out.
//!
//! [`Route`]: crate::Route

use core::fmt;

use crate::transition::TransitionStyle;

/// Zero-argument capability producing the renderable content of a layer.
pub type ContentFn<V> = Box<dyn Fn() -> Option<V>>;

/// Lifecycle callback receiving the item's slot index.
pub type LifecycleFn = Box<dyn FnMut(usize)>;

/// One entry on a modal stack.
pub struct PresentationItem<V> {
    id: String,
    animated: bool,
    style: TransitionStyle,
    content: ContentFn<V>,
    on_dismiss: Option<LifecycleFn>,
    on_did_load: Option<LifecycleFn>,
}

impl<V> fmt::Debug for PresentationItem<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PresentationItem")
            .field("id", &self.id)
            .field("animated", &self.animated)
            .field("style", &self.style)
            .field("on_dismiss", &self.on_dismiss.is_some())
            .field("on_did_load", &self.on_did_load.is_some())
            .finish()
    }
}

impl<V> PresentationItem<V> {
    /// Create a new item. `content` is called lazily, possibly many times,
    /// whenever the render surface needs the layer's content.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        style: TransitionStyle,
        content: impl Fn() -> Option<V> + 'static,
    ) -> Self {
        Self {
            id: id.into(),
            animated: true,
            style,
            content: Box::new(content),
            on_dismiss: None,
            on_did_load: None,
        }
    }

    /// Compose the identity of an item from its owner's id and the resolved
    /// transition style, so one owner presented under two styles yields two
    /// distinct items.
    #[must_use]
    pub fn compose_id(owner: &str, style: &TransitionStyle) -> String {
        format!("{owner} - {}", style.discriminant_name())
    }

    /// Set whether this item's insertion/removal is animated.
    #[must_use]
    pub fn animated(mut self, animated: bool) -> Self {
        self.animated = animated;
        self
    }

    /// Attach a dismissal callback, invoked with the item's slot index when
    /// the layer is removed.
    #[must_use]
    pub fn on_dismiss(mut self, f: impl FnMut(usize) + 'static) -> Self {
        self.on_dismiss = Some(Box::new(f));
        self
    }

    /// Attach a did-load callback, invoked with the item's slot index once
    /// the render surface confirms the layer has appeared.
    #[must_use]
    pub fn on_did_load(mut self, f: impl FnMut(usize) + 'static) -> Self {
        self.on_did_load = Some(Box::new(f));
        self
    }

    /// The item's composed identity.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Whether mutations of this item animate.
    #[must_use]
    pub fn is_animated(&self) -> bool {
        self.animated
    }

    /// The resolved transition style.
    #[must_use]
    pub fn style(&self) -> &TransitionStyle {
        &self.style
    }

    /// Resolve the layer's content. `None` when the owning flow is gone.
    #[must_use]
    pub fn resolve_content(&self) -> Option<V> {
        (self.content)()
    }

    /// Fire the dismissal callback, if any.
    pub(crate) fn notify_dismiss(&mut self, index: usize) {
        if let Some(f) = self.on_dismiss.as_mut() {
            f(index);
        }
    }

    /// Fire the did-load callback, if any.
    pub(crate) fn notify_did_load(&mut self, index: usize) {
        if let Some(f) = self.on_did_load.as_mut() {
            f(index);
        }
    }
}
