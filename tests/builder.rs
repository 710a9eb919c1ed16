use std::{
    cell::{Cell, RefCell},
    error::Error as StdError,
    rc::Rc,
    sync::Arc,
    time::Duration,
};

use cucumber_support::{
    definition::Category,
    error::{BoxError, RegistrationFailure},
    world::{Attach, Attachment},
    BuildConfig, DefaultWorld, DuplicateParameterTypeError, Error,
    FeaturesHookFn, HookOptions, ParameterType, ScenarioHookFn, StepFn,
    SupportCodeLibrary, SupportCodeLibraryBuilder, World, WorldConstructor,
    WorldContext, DEFAULT_TIMEOUT,
};
use derive_more::with_trait::{Display, Error as DeriveError};
use futures::{executor::block_on, FutureExt as _};
use gherkin::StepType;
use serde_json::json;

type Config = BuildConfig<DefaultWorld>;

fn build(config: Config) -> Result<SupportCodeLibrary<DefaultWorld>, Error> {
    _ = tracing_subscriber::fmt().with_test_writer().try_init();
    SupportCodeLibraryBuilder::build(config)
}

fn step() -> StepFn<DefaultWorld> {
    StepFn::new(|_, _| async {}.boxed_local())
}

fn scenario_hook() -> ScenarioHookFn<DefaultWorld> {
    ScenarioHookFn::new(|_, _| async {}.boxed_local())
}

fn features_hook() -> FeaturesHookFn {
    FeaturesHookFn::new(|| async {}.boxed_local())
}

fn context() -> (Attach, WorldContext) {
    let attach: Attach = Arc::new(|_| {});
    let ctx = WorldContext::new(Arc::clone(&attach), json!({"some": "data"}));
    (attach, ctx)
}

mod no_support_code {
    use super::*;

    #[test]
    fn everything_is_empty_with_defaults() {
        let lib = build(Config::new("path/to/project")).unwrap();

        assert!(lib.step_definitions().is_empty());
        assert!(lib.before_features_hook_definitions().is_empty());
        assert!(lib.after_features_hook_definitions().is_empty());
        assert!(lib.before_scenario_hook_definitions().is_empty());
        assert!(lib.after_scenario_hook_definitions().is_empty());
        assert!(lib.listeners().is_empty());
        assert_eq!(lib.default_timeout(), Duration::from_millis(5000));
        assert_eq!(lib.default_timeout(), DEFAULT_TIMEOUT);
        assert_eq!(lib.cwd().to_str(), Some("path/to/project"));
    }

    #[test]
    fn default_world_copies_context() {
        let lib = build(Config::new("path/to/project")).unwrap();
        let (attach, ctx) = context();

        let world = lib.world().construct(ctx);

        assert!(Arc::ptr_eq(&world.attach, &attach));
        assert_eq!(world.parameters, json!({"some": "data"}));
    }

    #[test]
    fn builtin_parameter_types_are_registered() {
        let lib = build(Config::new("path/to/project")).unwrap();
        let registry = lib.parameter_type_registry();

        for name in ["int", "float", "word", "string", ""] {
            assert!(registry.lookup_by_name(name).is_some(), "{name:?}");
        }
    }
}

mod steps {
    use super::*;

    #[test]
    fn kept_in_call_order() {
        let lib = build(Config::new("/p").with_fn(|dsl| {
            _ = dsl.given("a", step())?;
            _ = dsl.then_regex("^b$", step())?;
            _ = dsl.when("c", step())?;
            Ok(())
        }))
        .unwrap();

        let defs = lib.step_definitions();
        assert_eq!(defs.len(), 3);
        assert_eq!(
            defs.iter().map(|d| d.keyword).collect::<Vec<_>>(),
            [StepType::Given, StepType::Then, StepType::When],
        );
        assert_eq!(
            defs.iter().map(|d| d.pattern.as_str()).collect::<Vec<_>>(),
            ["a", "^b$", "c"],
        );
        assert!(defs[1].pattern.is_regex());
    }

    #[test]
    fn code_is_kept_as_is() {
        let code = StepFn::new(|w: &mut DefaultWorld, ctx| {
            async move { w.attach(ctx.step.value, "text/plain") }.boxed_local()
        });
        let registered = code.clone();

        let lib = build(Config::new("/p").with_fn(move |dsl| {
            _ = dsl.given(regex::Regex::new("^x$")?, registered)?;
            Ok(())
        }))
        .unwrap();

        assert!(lib.step_definitions()[0].code.ptr_eq(&code));
    }

    #[test]
    fn code_runs_on_constructed_world() {
        let lib = build(Config::new("/p").with_fn(|dsl| {
            _ = dsl.given(
                "I have {int} cucumbers",
                StepFn::new(|w: &mut DefaultWorld, ctx| {
                    async move { w.attach(ctx.matches.join(","), "text/plain") }
                        .boxed_local()
                }),
            )?;
            Ok(())
        }))
        .unwrap();
        let attached = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&attached);
        let mut world = lib.world().construct(WorldContext::new(
            Arc::new(move |a: Attachment| sink.borrow_mut().push(a.data)),
            json!({}),
        ));

        block_on(lib.step_definitions()[0].code.call(
            &mut world,
            cucumber_support::step::Context {
                step: gherkin::Step {
                    keyword: "Given ".into(),
                    ty: StepType::Given,
                    value: "I have 5 cucumbers".into(),
                    docstring: None,
                    table: None,
                    span: gherkin::Span { start: 0, end: 0 },
                    position: gherkin::LineCol { line: 1, col: 1 },
                },
                matches: vec!["5".into()],
            },
        ));

        assert_eq!(*attached.borrow(), [b"5".to_vec()]);
    }
}

mod scenario_hooks {
    use super::*;

    #[test]
    fn after_each_is_reversed() {
        let (a, b) = (scenario_hook(), scenario_hook());
        let (reg_a, reg_b) = (a.clone(), b.clone());

        let lib = build(Config::new("/p").with_fn(move |dsl| {
            _ = dsl.after_each(reg_a)?;
            _ = dsl.after_each(reg_b)?;
            Ok(())
        }))
        .unwrap();

        let defs = lib.after_scenario_hook_definitions();
        assert_eq!(defs.len(), 2);
        assert!(defs[0].code.ptr_eq(&b));
        assert!(defs[1].code.ptr_eq(&a));
    }

    #[test]
    fn before_each_keeps_order() {
        let (a, b) = (scenario_hook(), scenario_hook());
        let (reg_a, reg_b) = (a.clone(), b.clone());

        let lib = build(Config::new("/p").with_fn(move |dsl| {
            _ = dsl.before_each(reg_a)?;
            _ = dsl.before_each(reg_b)?;
            Ok(())
        }))
        .unwrap();

        let defs = lib.before_scenario_hook_definitions();
        assert_eq!(defs.len(), 2);
        assert!(defs[0].code.ptr_eq(&a));
        assert!(defs[1].code.ptr_eq(&b));
    }

    #[test]
    fn order_spans_support_code_fns() {
        let hooks = [scenario_hook(), scenario_hook(), scenario_hook()];
        let [a, b, c] = hooks.clone();
        let (after_a, after_c) = (a.clone(), c.clone());

        let lib = build(
            Config::new("/p")
                .with_fn(move |dsl| {
                    _ = dsl.before_each(a)?;
                    _ = dsl.before_each(b)?;
                    _ = dsl.after_each(after_a)?;
                    Ok(())
                })
                .with_fn(move |dsl| {
                    _ = dsl.before_each(c)?;
                    _ = dsl.after_each(after_c)?;
                    Ok(())
                }),
        )
        .unwrap();

        let before = lib.before_scenario_hook_definitions();
        assert!(before.iter().zip(&hooks).all(|(d, h)| d.code.ptr_eq(h)));
        let after = lib.after_scenario_hook_definitions();
        assert!(after[0].code.ptr_eq(&hooks[2]));
        assert!(after[1].code.ptr_eq(&hooks[0]));
    }

    #[test]
    fn code_only() {
        let code = scenario_hook();
        let registered = code.clone();

        let lib = build(Config::new("/p").with_fn(move |dsl| {
            _ = dsl.before_each(registered)?;
            Ok(())
        }))
        .unwrap();

        let defs = lib.before_scenario_hook_definitions();
        assert_eq!(defs.len(), 1);
        assert!(defs[0].code.ptr_eq(&code));
        assert_eq!(defs[0].tags(), None);
        assert_eq!(defs[0].options.timeout, None);
    }

    #[test]
    fn tag_string_and_code() {
        let code = scenario_hook();
        let registered = code.clone();

        let lib = build(Config::new("/p").with_fn(move |dsl| {
            _ = dsl.before_each(("@tagA", registered))?;
            Ok(())
        }))
        .unwrap();

        let defs = lib.before_scenario_hook_definitions();
        assert_eq!(defs.len(), 1);
        assert!(defs[0].code.ptr_eq(&code));
        assert_eq!(defs[0].tags(), Some("@tagA"));
    }

    #[test]
    fn options_and_code() {
        let code = scenario_hook();
        let registered = code.clone();

        let lib = build(Config::new("/p").with_fn(move |dsl| {
            _ = dsl.before_each((
                HookOptions::tagged("@tagA").with_timeout(Duration::from_secs(1)),
                registered,
            ))?;
            Ok(())
        }))
        .unwrap();

        let defs = lib.before_scenario_hook_definitions();
        assert_eq!(defs.len(), 1);
        assert!(defs[0].code.ptr_eq(&code));
        assert_eq!(defs[0].tags(), Some("@tagA"));
        assert_eq!(defs[0].timeout_or(DEFAULT_TIMEOUT), Duration::from_secs(1));
    }

    #[test]
    fn tagged_hooks_filter_scenarios() {
        let lib = build(Config::new("/p").with_fn(|dsl| {
            _ = dsl.after_each(("@db and not @slow", scenario_hook()))?;
            Ok(())
        }))
        .unwrap();

        let hook = &lib.after_scenario_hook_definitions()[0];
        assert!(hook.applies_to(["@db"]).unwrap());
        assert!(!hook.applies_to(["@db", "@slow"]).unwrap());
    }
}

mod features_hooks {
    use super::*;

    #[test]
    fn after_is_reversed_and_before_is_not() {
        let (a, b) = (features_hook(), features_hook());
        let (c, d) = (features_hook(), features_hook());
        let regs = (a.clone(), b.clone(), c.clone(), d.clone());

        let lib = build(Config::new("/p").with_fn(move |dsl| {
            let (a, b, c, d) = regs;
            _ = dsl.before(a)?;
            _ = dsl.before(("@x", b))?;
            _ = dsl.after(c)?;
            _ = dsl.after((HookOptions::default(), d))?;
            Ok(())
        }))
        .unwrap();

        let before = lib.before_features_hook_definitions();
        assert!(before[0].code.ptr_eq(&a));
        assert!(before[1].code.ptr_eq(&b));
        assert_eq!(before[1].tags(), Some("@x"));
        let after = lib.after_features_hook_definitions();
        assert!(after[0].code.ptr_eq(&d));
        assert!(after[1].code.ptr_eq(&c));
    }
}

mod world_constructor {
    use super::*;

    #[derive(Debug)]
    struct Counter(u64);

    impl World for Counter {
        fn new(ctx: WorldContext) -> Self {
            Self(ctx.parameters["start"].as_u64().unwrap_or_default())
        }
    }

    #[test]
    fn last_one_wins() {
        let first = WorldConstructor::new(|_| DefaultWorld::new(context().1));
        let second = WorldConstructor::new(|ctx: WorldContext| {
            DefaultWorld::new(WorldContext::new(ctx.attach, json!("second")))
        });
        let regs = (first.clone(), second.clone());

        let lib = build(Config::new("/p").with_fn(move |dsl| {
            dsl.set_world_constructor(regs.0);
            dsl.set_world_constructor(regs.1);
            Ok(())
        }))
        .unwrap();

        assert!(lib.world().ptr_eq(&second));
        assert!(!lib.world().ptr_eq(&first));
        assert_eq!(lib.world().construct(context().1).parameters, json!("second"));
    }

    #[test]
    fn defaults_to_world_new() {
        let lib = SupportCodeLibraryBuilder::<Counter>::build(
            BuildConfig::new("/p"),
        )
        .unwrap();

        let world = lib
            .world()
            .construct(WorldContext::detached(json!({"start": 7})));

        assert_eq!(world.0, 7);
    }
}

mod parameter_types {
    use super::*;

    #[test]
    fn custom_type_is_registered() {
        let lib = build(Config::new("/p").with_fn(|dsl| {
            dsl.define_parameter_type(
                ParameterType::new("color", ["red|blue"])
                    .transformer(|g| Ok::<_, BoxError>(g[0].len())),
            )?;
            Ok(())
        }))
        .unwrap();

        let ty = lib.parameter_type_registry().lookup_by_name("color").unwrap();
        let value = ty.transform(&["blue"]).unwrap();
        assert_eq!(value.downcast_ref::<usize>(), Some(&4));
    }

    #[test]
    fn duplicate_name_fails_build() {
        let err = build(Config::new("/p").with_fn(|dsl| {
            dsl.define_parameter_type(ParameterType::new("int", [r"\d+"]))?;
            Ok(())
        }))
        .unwrap_err();

        assert!(err.is_duplicate_parameter_type(), "got {err}");
        assert!(matches!(
            err,
            Error::DuplicateParameterType(DuplicateParameterTypeError {
                ref name, location: Some(_),
            }) if name == "int",
        ));
    }
}

mod failures {
    use cucumber_support::args::{Argument, RawArgs};

    use super::*;

    #[derive(Debug, Display, DeriveError)]
    #[display("database is down")]
    struct DatabaseDown;

    #[test]
    fn dsl_error_keeps_identity() {
        let err = build(Config::new("/p").with_fn(|dsl| {
            _ = dsl.before_each(RawArgs::<
                HookOptions,
                ScenarioHookFn<DefaultWorld>,
            >(Vec::new()))?;
            Ok(())
        }))
        .unwrap_err();

        let Error::InvalidDefinition(e) = err else {
            panic!("expected `InvalidDefinition`, got {err}");
        };
        assert_eq!(e.category, Category::BeforeScenario);
        assert!(e.location.unwrap().path.ends_with("builder.rs"));
        assert!(e.to_string().starts_with("Invalid `BeforeEach` definition"));
    }

    #[test]
    fn ignored_dsl_errors_still_fail_build() {
        let ran_after = Rc::new(Cell::new(false));
        let ran = Rc::clone(&ran_after);

        let err = build(
            Config::new("/p")
                .with_fn(|dsl| {
                    let _ = dsl.before_each(RawArgs::<
                        HookOptions,
                        ScenarioHookFn<DefaultWorld>,
                    >(vec![]));
                    let _ = dsl.define_parameter_type(ParameterType::new(
                        "int",
                        [r"\d+"],
                    ));
                    let _ = dsl.given_regex("^(unclosed$", step());
                    Ok(())
                })
                .with_fn(move |_| {
                    ran.set(true);
                    Ok(())
                }),
        )
        .unwrap_err();

        assert!(!ran_after.get());
        let Error::InvalidDefinition(e) = err else {
            panic!("expected `InvalidDefinition`, got {err}");
        };
        assert_eq!(e.category, Category::BeforeScenario);
    }

    #[test]
    fn handled_dsl_error_still_fails_build() {
        let err = build(Config::new("/p").with_fn(|dsl| {
            if dsl.when("", step()).is_err() {
                _ = dsl.when("fallback", step())?;
            }
            Ok(())
        }))
        .unwrap_err();

        assert!(err.is_invalid_definition(), "got {err}");
        assert!(err.to_string().contains("When"), "got {err}");
    }

    #[test]
    fn foreign_error_is_wrapped() {
        let ran_after = Rc::new(Cell::new(false));
        let ran = Rc::clone(&ran_after);

        let err = build(
            Config::new("/p")
                .with_fn(|dsl| {
                    _ = dsl.given("a", step())?;
                    Ok(())
                })
                .with_named_fn("db", |_| Err(DatabaseDown.into()))
                .with_fn(move |_| {
                    ran.set(true);
                    Ok(())
                }),
        )
        .unwrap_err();

        assert!(!ran_after.get());
        let Error::UserRegistration(e) = &err else {
            panic!("expected `UserRegistration`, got {err}");
        };
        assert_eq!(e.index, 1);
        assert_eq!(e.name.as_deref(), Some("db"));
        assert!(matches!(&e.failure, RegistrationFailure::Error(src)
            if src.downcast_ref::<DatabaseDown>().is_some()));
        assert_eq!(
            StdError::source(e).map(ToString::to_string).as_deref(),
            Some("database is down"),
        );
    }

    #[test]
    fn returned_library_error_is_not_wrapped() {
        let err = build(Config::new("/p").with_fn(|_| {
            Err(Error::from(DuplicateParameterTypeError {
                name: "custom".into(),
                location: None,
            })
            .into())
        }))
        .unwrap_err();

        assert!(err.is_duplicate_parameter_type(), "got {err}");
    }

    #[test]
    fn panic_is_wrapped() {
        let err = build(Config::new("/p").with_fn(|_| panic!("oops"))).unwrap_err();

        let Error::UserRegistration(e) = &err else {
            panic!("expected `UserRegistration`, got {err}");
        };
        assert_eq!(e.index, 0);
        assert_eq!(e.panic_message(), Some("oops"));
    }

    #[test]
    fn missing_code_in_raw_arguments() {
        let err = build(Config::new("/p").with_fn(|dsl| {
            _ = dsl.after_each(RawArgs::<HookOptions, ScenarioHookFn<DefaultWorld>>(vec![
                Argument::Tags("@a".into()),
            ]))?;
            Ok(())
        }))
        .unwrap_err();

        assert!(err.is_invalid_definition(), "got {err}");
        assert!(err.to_string().contains("AfterEach"), "got {err}");
    }
}

mod parts {
    use super::*;

    #[test]
    fn into_parts_hands_over_everything() {
        let lib = build(Config::new("/p").with_fn(|dsl| {
            _ = dsl.given("a", step())?;
            _ = dsl.after_each(scenario_hook())?;
            dsl.set_default_timeout(Duration::from_secs(9));
            Ok(())
        }))
        .unwrap();

        let parts = lib.into_parts();

        assert_eq!(parts.step_definitions.len(), 1);
        assert_eq!(parts.after_scenario_hook_definitions.len(), 1);
        assert_eq!(parts.default_timeout, Duration::from_secs(9));
        assert_eq!(parts.cwd.to_str(), Some("/p"));
    }
}
