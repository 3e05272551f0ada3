//! The core invocation primitive.
//!
//! Two call shapes share one signature and one return type: "tell this
//! entity something happened" and "run this turn phase for the whole
//! world". Their failure semantics differ deliberately. An entity-
//! targeted event that no attached module understands is an authoring
//! bug and fails fast with a wiring diagnostic; a turn phase that
//! nothing in the world cares about is the normal case and yields
//! [`IGNORE_EVENT`](crate::result::IGNORE_EVENT).

mod context;
mod turn;

pub use context::*;
pub use turn::*;

use thiserror::Error;
use tracing::{debug, trace};

use crate::hatch::{HatchLibrary, HatchResolver};
use crate::module::EventHandler;
use crate::registry::Catalog;
use crate::result::{EventResult, IGNORE_EVENT, NO_HANDLER};
use crate::scheduler::{ScheduleError, TurnScheduler};
use world_model::{EntityId, WorldState};

/// Fatal dispatch-time errors.
///
/// Each one marks an authoring bug - wrong module attached, event name
/// typo, missing handler - that must surface during content testing, not
/// be masked as graceful degradation far from the root cause.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(
        "entity `{entity}` has no handler for event `{event}` \
         (attached modules: [{}]; catalog modules implementing it: [{}])",
        .attached.join(", "),
        .implementors.join(", ")
    )]
    NoHandler {
        entity: EntityId,
        event: String,
        attached: Vec<String>,
        implementors: Vec<String>,
    },

    #[error("entity `{entity}` does not exist in the world state")]
    UnknownEntity { entity: EntityId },

    #[error("entity `{entity}` lists module `{module}` which is not in the catalog")]
    UnknownModule { entity: EntityId, module: String },
}

/// The dispatcher: resolves and invokes handlers for named events and
/// combines their results.
///
/// Owns the frozen catalog, the precomputed turn sequence, and the
/// memoizing escape-hatch resolver. Construction completes the load
/// phase; nothing is added or removed afterward.
pub struct Dispatcher {
    catalog: Catalog,
    scheduler: TurnScheduler,
    hatches: HatchResolver,
}

impl Dispatcher {
    /// Build a dispatcher over a loaded catalog.
    ///
    /// The turn sequence is computed here, so a hook-ordering cycle
    /// fails construction rather than surfacing mid-game.
    pub fn new(catalog: Catalog, hatches: HatchLibrary) -> Result<Self, ScheduleError> {
        let scheduler = TurnScheduler::build(&catalog)?;
        Ok(Self {
            catalog,
            scheduler,
            hatches: HatchResolver::new(hatches),
        })
    }

    /// The frozen module catalog.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// The frozen turn sequence.
    pub fn scheduler(&self) -> &TurnScheduler {
        &self.scheduler
    }

    /// Invoke an event on a specific entity, or globally when `target`
    /// is absent.
    ///
    /// Always returns a fully-formed [`EventResult`] on success; callers
    /// branch on the result, never on presence. On the entity path, an
    /// event no attached module implements is fatal. On the global path,
    /// zero registered modules is the normal quiet case.
    pub fn invoke(
        &self,
        world: &mut WorldState,
        target: Option<&EntityId>,
        event: &str,
        ctx: &EventContext,
    ) -> Result<EventResult, DispatchError> {
        match target {
            Some(id) => {
                let result = self.dispatch_entity(world, id, event, ctx)?;
                if result.is_no_handler() {
                    return Err(self.no_handler_error(world, id, event));
                }
                Ok(result)
            }
            None => Ok(self.dispatch_global(world, event, ctx)),
        }
    }

    /// Entity-targeted dispatch, returning the internal [`NO_HANDLER`]
    /// sentinel instead of an error when nothing responds. The turn
    /// runner uses this form to skip non-participating entities.
    fn dispatch_entity(
        &self,
        world: &mut WorldState,
        id: &EntityId,
        event: &str,
        ctx: &EventContext,
    ) -> Result<EventResult, DispatchError> {
        let entity = world
            .entity(id)
            .ok_or_else(|| DispatchError::UnknownEntity { entity: id.clone() })?;
        let behaviors = entity.behaviors.clone();
        let override_ref = entity.handler_override(event).map(str::to_string);

        let mut handlers: Vec<EventHandler> = Vec::new();
        for path in &behaviors {
            let Some(module) = self.catalog.module(path) else {
                return Err(DispatchError::UnknownModule {
                    entity: id.clone(),
                    module: path.clone(),
                });
            };
            if let Some(handler) = module.handler(event) {
                handlers.push(handler);
            }
        }
        if handlers.is_empty() {
            return Ok(NO_HANDLER);
        }

        trace!(
            "dispatching `{}` to entity `{}` across {} handler(s)",
            event,
            id,
            handlers.len()
        );

        let mut results = Vec::with_capacity(handlers.len());
        for handler in handlers {
            // A resolvable override supersedes the module default; a
            // failed resolution falls back softly (already logged by the
            // resolver).
            let effective = match &override_ref {
                Some(reference) => self.hatches.resolve(reference).unwrap_or(handler),
                None => handler,
            };
            results.push(effective(Some(id), world, ctx));
        }
        Ok(EventResult::combine(results))
    }

    /// Global dispatch for turn-phase events.
    fn dispatch_global(
        &self,
        world: &mut WorldState,
        event: &str,
        ctx: &EventContext,
    ) -> EventResult {
        let registered = self.catalog.global_handlers(event);
        if registered.is_empty() {
            debug!("no modules registered for global event `{}`", event);
            return IGNORE_EVENT;
        }

        let mut results = Vec::with_capacity(registered.len());
        for path in registered {
            if let Some(handler) = self.catalog.module(path).and_then(|m| m.handler(event)) {
                results.push(handler(None, world, ctx));
            }
        }
        EventResult::combine(results)
    }

    fn no_handler_error(&self, world: &WorldState, id: &EntityId, event: &str) -> DispatchError {
        let attached = world
            .entity(id)
            .map(|e| e.behaviors.clone())
            .unwrap_or_default();
        DispatchError::NoHandler {
            entity: id.clone(),
            event: event.to_string(),
            attached,
            implementors: self.catalog.modules_implementing(event).to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::{CapabilityModule, HookDeclaration, Invocation};
    use crate::registry::{ModuleError, ModuleLibrary, Tier};
    use world_model::{Entity, EntityKind};

    fn claws(_: Option<&EntityId>, _: &mut WorldState, _: &EventContext) -> EventResult {
        EventResult::allow_with("scratched")
    }

    fn armor(_: Option<&EntityId>, _: &mut WorldState, _: &EventContext) -> EventResult {
        EventResult::deny("but the armor holds")
    }

    fn decline(_: Option<&EntityId>, _: &mut WorldState, _: &EventContext) -> EventResult {
        IGNORE_EVENT
    }

    fn tally(entity: Option<&EntityId>, world: &mut WorldState, _: &EventContext) -> EventResult {
        let id = entity.expect("entity-targeted").clone();
        let entity = world.entity_mut(&id).expect("entity exists");
        let count = entity.property_i64("tally").unwrap_or(0) + 1;
        entity.set_property("tally", count);
        EventResult::allow_with(format!("tally is {}", count))
    }

    fn gust(_: Option<&EntityId>, world: &mut WorldState, _: &EventContext) -> EventResult {
        world.set_flag("windy", world_model::FlagValue::Bool(true));
        EventResult::allow_with("the wind picks up")
    }

    fn hatch_douse(_: Option<&EntityId>, _: &mut WorldState, _: &EventContext) -> EventResult {
        EventResult::deny("a strange dampness swallows the spark")
    }

    fn claws_module() -> Result<CapabilityModule, ModuleError> {
        Ok(CapabilityModule::new("demo/claws").with_handler("on_damage", claws))
    }

    fn armor_module() -> Result<CapabilityModule, ModuleError> {
        Ok(CapabilityModule::new("demo/armor").with_handler("on_damage", armor))
    }

    fn candle_module() -> Result<CapabilityModule, ModuleError> {
        Ok(CapabilityModule::new("demo/candle")
            .with_handler("on_ignite", claws)
            .with_handler("on_snuff", decline))
    }

    fn shy_module() -> Result<CapabilityModule, ModuleError> {
        Ok(CapabilityModule::new("demo/shy")
            .with_handler("on_damage", decline)
            .with_handler("on_ignite", decline))
    }

    fn tally_module() -> Result<CapabilityModule, ModuleError> {
        Ok(CapabilityModule::new("demo/tally").with_handler("on_damage", tally))
    }

    fn weather_module() -> Result<CapabilityModule, ModuleError> {
        Ok(CapabilityModule::new("demo/weather")
            .with_handler("weather_shift", gust)
            .with_hook(HookDeclaration::new("weather_shift", Invocation::Global)))
    }

    fn library() -> ModuleLibrary {
        let mut library = ModuleLibrary::new();
        library.register(Tier::Core, "demo/claws", claws_module);
        library.register(Tier::Core, "demo/armor", armor_module);
        library.register(Tier::Core, "demo/candle", candle_module);
        library.register(Tier::Core, "demo/shy", shy_module);
        library.register(Tier::Core, "demo/tally", tally_module);
        library.register(Tier::Core, "demo/weather", weather_module);
        library
    }

    fn dispatcher(declared: &[(Tier, &str)]) -> Dispatcher {
        dispatcher_with_hatches(declared, HatchLibrary::new())
    }

    fn dispatcher_with_hatches(declared: &[(Tier, &str)], hatches: HatchLibrary) -> Dispatcher {
        let catalog = Catalog::load(declared, &library()).expect("load");
        Dispatcher::new(catalog, hatches).expect("schedule")
    }

    #[test]
    fn test_results_combine_in_module_order() {
        let dispatcher = dispatcher(&[(Tier::Core, "demo/claws"), (Tier::Core, "demo/armor")]);
        let mut world = WorldState::new();
        let id = world.add_entity(
            Entity::new("E1", "Test Subject", EntityKind::Actor)
                .with_behavior("demo/claws")
                .with_behavior("demo/armor"),
        );

        let result = dispatcher
            .invoke(&mut world, Some(&id), "on_damage", &EventContext::new())
            .expect("both modules respond");

        let response = result.responded().expect("responded");
        assert!(!response.allow);
        assert_eq!(
            response.feedback.as_deref(),
            Some("scratched\nbut the armor holds")
        );
    }

    #[test]
    fn test_missing_entity_handler_is_fatal_with_wiring_diagnostic() {
        let dispatcher = dispatcher(&[(Tier::Core, "demo/candle"), (Tier::Core, "demo/claws")]);
        let mut world = WorldState::new();
        let id = world.add_entity(
            Entity::new("E2", "Wet Log", EntityKind::Item).with_behavior("demo/claws"),
        );

        let err = dispatcher
            .invoke(&mut world, Some(&id), "on_ignite", &EventContext::new())
            .err()
            .expect("fatal");

        let message = err.to_string();
        assert!(message.contains("E2"), "missing entity id in `{}`", message);
        assert!(
            message.contains("demo/claws"),
            "missing attached module in `{}`",
            message
        );
        assert!(
            message.contains("demo/candle"),
            "missing implementing module in `{}`",
            message
        );
    }

    #[test]
    fn test_unknown_entity_is_fatal() {
        let dispatcher = dispatcher(&[(Tier::Core, "demo/claws")]);
        let mut world = WorldState::new();
        let ghost = EntityId::new("ghost");

        let err = dispatcher
            .invoke(&mut world, Some(&ghost), "on_damage", &EventContext::new())
            .err()
            .expect("fatal");
        assert!(matches!(err, DispatchError::UnknownEntity { .. }));
    }

    #[test]
    fn test_unknown_attached_module_is_fatal() {
        let dispatcher = dispatcher(&[(Tier::Core, "demo/claws")]);
        let mut world = WorldState::new();
        let id = world.add_entity(
            Entity::new("E3", "Miswired", EntityKind::Actor).with_behavior("demo/ghost"),
        );

        let err = dispatcher
            .invoke(&mut world, Some(&id), "on_damage", &EventContext::new())
            .err()
            .expect("fatal");
        assert!(
            matches!(err, DispatchError::UnknownModule { module, .. } if module == "demo/ghost")
        );
    }

    #[test]
    fn test_all_handlers_declining_propagates_ignored() {
        let dispatcher = dispatcher(&[(Tier::Core, "demo/shy")]);
        let mut world = WorldState::new();
        let id = world
            .add_entity(Entity::new("E4", "Wallflower", EntityKind::Actor).with_behavior("demo/shy"));

        let result = dispatcher
            .invoke(&mut world, Some(&id), "on_damage", &EventContext::new())
            .expect("handled");
        assert_eq!(result, IGNORE_EVENT);
    }

    #[test]
    fn test_global_event_with_no_registration_is_quietly_ignored() {
        let dispatcher = dispatcher(&[(Tier::Core, "demo/claws")]);
        let mut world = WorldState::new();

        let result = dispatcher
            .invoke(&mut world, None, "weather_shift", &EventContext::new())
            .expect("never fatal");
        assert_eq!(result, IGNORE_EVENT);
    }

    #[test]
    fn test_global_event_runs_registered_modules() {
        let dispatcher = dispatcher(&[(Tier::Core, "demo/weather")]);
        let mut world = WorldState::new();

        let result = dispatcher
            .invoke(&mut world, None, "weather_shift", &EventContext::new())
            .expect("registered");

        assert_eq!(result.feedback(), Some("the wind picks up"));
        assert_eq!(
            world.flag("windy"),
            Some(&world_model::FlagValue::Bool(true))
        );
    }

    #[test]
    fn test_escape_hatch_supersedes_module_default() {
        let mut hatches = HatchLibrary::new();
        hatches.register("demo/curses", "douse", hatch_douse);
        let dispatcher =
            dispatcher_with_hatches(&[(Tier::Core, "demo/candle")], hatches);

        let mut world = WorldState::new();
        let id = world.add_entity(
            Entity::new("idol", "Cursed Idol", EntityKind::Item)
                .with_behavior("demo/candle")
                .with_property("on_ignite_handler", "demo/curses::douse"),
        );

        let result = dispatcher
            .invoke(&mut world, Some(&id), "on_ignite", &EventContext::new())
            .expect("handled");

        assert!(!result.allows());
        assert_eq!(
            result.feedback(),
            Some("a strange dampness swallows the spark")
        );
    }

    #[test]
    fn test_unresolvable_hatch_falls_back_to_module_default() {
        let dispatcher = dispatcher(&[(Tier::Core, "demo/candle")]);
        let mut world = WorldState::new();
        let id = world.add_entity(
            Entity::new("idol", "Cursed Idol", EntityKind::Item)
                .with_behavior("demo/candle")
                .with_property("on_ignite_handler", "demo/curses::missing"),
        );

        let result = dispatcher
            .invoke(&mut world, Some(&id), "on_ignite", &EventContext::new())
            .expect("soft failure never aborts");
        assert_eq!(result.feedback(), Some("scratched"));
    }

    #[test]
    fn test_hatch_only_applies_to_its_own_event() {
        let mut hatches = HatchLibrary::new();
        hatches.register("demo/curses", "douse", hatch_douse);
        let dispatcher = dispatcher_with_hatches(
            &[(Tier::Core, "demo/claws")],
            hatches,
        );

        let mut world = WorldState::new();
        let id = world.add_entity(
            Entity::new("cat", "Cat", EntityKind::Actor)
                .with_behavior("demo/claws")
                .with_property("on_ignite_handler", "demo/curses::douse"),
        );

        let result = dispatcher
            .invoke(&mut world, Some(&id), "on_damage", &EventContext::new())
            .expect("handled");
        assert_eq!(result.feedback(), Some("scratched"));
    }

    #[test]
    fn test_dispatch_is_deterministic() {
        let declared = [(Tier::Core, "demo/tally"), (Tier::Core, "demo/armor")];
        let seed = Entity::new("E5", "Subject", EntityKind::Actor)
            .with_behavior("demo/tally")
            .with_behavior("demo/armor");

        let mut first_world = WorldState::new();
        let mut second_world = WorldState::new();
        let id = first_world.add_entity(seed.clone());
        second_world.add_entity(seed);

        let first = dispatcher(&declared)
            .invoke(&mut first_world, Some(&id), "on_damage", &EventContext::new())
            .expect("handled");
        let second = dispatcher(&declared)
            .invoke(&mut second_world, Some(&id), "on_damage", &EventContext::new())
            .expect("handled");

        assert_eq!(first, second);
        assert_eq!(first_world, second_world);
        assert_eq!(
            first_world.entity(&id).unwrap().property_i64("tally"),
            Some(1)
        );
    }
}
