//! The cellar design.
//!
//! A virtual wine cellar: accounts own bottles, bottles can be rated and
//! every write requires an `Authorization` header.

use blueprint_define::prelude::*;

/// Creates the cellar design.
///
/// ## Resources
///
/// - `account` - `/accounts/:accountID`, show/create/update/delete
/// - `bottle` - nested under an account at `/accounts/:accountID/bottles`,
///   list/show/create/update/rate/delete
/// - `health` - `GET /health`
///
/// ## Examples
///
/// ```rust
/// use blueprint_definitions::cellar::define_cellar_design;
///
/// let api = define_cellar_design().run().unwrap();
/// let bottle = &api.resources["bottle"];
/// assert_eq!(bottle.actions.len(), 6);
/// ```
pub fn define_cellar_design() -> Design {
    let mut design = Design::new();

    design.api("cellar", |api| {
        api.title("The virtual wine cellar");
        api.description("A basic example of a CRUD API implemented with blueprint");
        api.base_path("/:accountID");
        api.base_params(|p| {
            p.attribute_with("accountID", Primitive::Integer, |a| {
                a.description("Account ID").minimum(1);
            });
        });
        api.response_template("Created", 1, |r, args| {
            r.description("Resource created");
            if let Some(location) = args.first() {
                r.header("Location", location);
            }
        });
        api.trait_def("Authenticated", |a| {
            a.headers(|h| {
                h.attribute("Authorization", Primitive::String);
                h.required(["Authorization"]);
            });
            a.response("Unauthorized");
        });
        api.response("NotFound", |r| {
            r.description("Resource not found");
        });
    });

    design.user_type("BottlePayload", |a| {
        a.attribute_with("name", Primitive::String, |n| {
            n.min_length(2);
        });
        a.attribute_with("vintage", Primitive::Integer, |v| {
            v.minimum(1900).maximum(2100);
        });
        a.attribute_with("color", Primitive::String, |c| {
            c.enum_values(["red", "white", "rose", "yellow", "sparkling"]);
        });
        a.attribute_with("sweetness", Primitive::Integer, |s| {
            s.minimum(1).maximum(5);
        });
        a.attribute("country", Primitive::String);
        a.attribute("region", Primitive::String);
        a.attribute_with("review", Primitive::String, |r| {
            r.max_length(300);
        });
        a.required(["name", "vintage", "color"]);
    });

    design.media_type("Account", "application/vnd.cellar.account+json", |mt| {
        mt.description("A tenant account");
        mt.attributes(|a| {
            a.attribute_with("id", Primitive::Integer, |i| {
                i.description("ID of account");
            });
            a.attribute_with("href", Primitive::String, |h| {
                h.description("API href of account");
            });
            a.attribute_with("name", Primitive::String, |n| {
                n.description("Name of account");
            });
            a.attribute_with("created_at", Primitive::String, |c| {
                c.format(Format::DateTime);
            });
            a.attribute_with("created_by", Primitive::String, |c| {
                c.format(Format::Email);
            });
            a.required(["id", "href", "name"]);
        });
        mt.view("default", |v| {
            v.attribute("id")
                .attribute("href")
                .attribute("name")
                .attribute("created_at")
                .attribute("created_by");
        });
        mt.view("tiny", |v| {
            v.attribute("id").attribute("href").attribute("name");
        });
        mt.view("link", |v| {
            v.attribute("id").attribute("href");
        });
    });

    design.media_type("Bottle", "application/vnd.cellar.bottle+json", |mt| {
        mt.description("A bottle of wine");
        mt.reference("BottlePayload");
        mt.attributes(|a| {
            a.attribute_with("id", Primitive::Integer, |i| {
                i.description("ID of bottle");
            });
            a.attribute("href", Primitive::String);
            a.attribute("account", DataType::media_type("Account"));
            a.attribute_with("rating", Primitive::Integer, |r| {
                r.minimum(1).maximum(5);
            });
            a.attribute_with("created_at", Primitive::String, |c| {
                c.format(Format::DateTime);
            });
            a.required(["id", "href", "name", "account"]);
        });
        mt.link("account");
        mt.view("default", |v| {
            v.attribute("id")
                .attribute("href")
                .attribute("name")
                .attribute("vintage")
                .attribute("color")
                .attribute("rating")
                .attribute("account:tiny")
                .link("account");
        });
        mt.view("tiny", |v| {
            v.attribute("id").attribute("href").attribute("name").attribute("rating");
        });
    });

    design.media_type("BottlePage", "application/vnd.cellar.bottle-page+json", |mt| {
        mt.description("A page of bottles");
        mt.attributes(|a| {
            a.attribute("bottles", DataType::array(DataType::media_type("Bottle")));
            a.attribute("count", Primitive::Integer);
            a.required(["bottles", "count"]);
        });
    });

    design.resource("account", |r| {
        r.description("Tenant accounts");
        r.base_path("//accounts");
        r.media_type("Account");
        r.canonical_action("show");
        r.action("show", |a| {
            a.description("Retrieve account with given id");
            a.get("/:accountID");
            a.params(|p| {
                p.attribute("accountID", Primitive::Integer);
            });
            a.views(["default", "tiny"]);
            a.response_template(OK, &["Account"]);
            a.response("NotFound");
        });
        r.action("create", |a| {
            a.description("Create new account");
            a.post("");
            a.use_trait("Authenticated");
            a.payload_with(DataType::object(), |p| {
                p.attribute_with("name", Primitive::String, |n| {
                    n.min_length(1);
                });
                p.required(["name"]);
            });
            a.response_template("Created", &["/^/accounts/[0-9]+$/"]);
        });
        r.action("update", |a| {
            a.description("Change account name");
            a.put("/:accountID");
            a.use_trait("Authenticated");
            a.params(|p| {
                p.attribute("accountID", Primitive::Integer);
            });
            a.payload_with(DataType::object(), |p| {
                p.attribute("name", Primitive::String);
                p.required(["name"]);
            });
            a.response("NoContent");
            a.response("NotFound");
        });
        r.action("delete", |a| {
            a.delete("/:accountID");
            a.use_trait("Authenticated");
            a.params(|p| {
                p.attribute("accountID", Primitive::Integer);
            });
            a.response("NoContent");
            a.response("NotFound");
        });
    });

    design.resource("bottle", |r| {
        r.description("A wine bottle");
        r.base_path("/bottles");
        r.parent("account");
        r.media_type("Bottle");
        r.canonical_action("show");
        r.action("list", |a| {
            a.description("List all bottles in account optionally filtering by year");
            a.get("");
            a.params(|p| {
                p.attribute_with("years", DataType::array(Primitive::Integer), |y| {
                    y.description("Filter by years");
                });
                p.attribute_with("page", Primitive::Integer, |pg| {
                    pg.default(1).minimum(1);
                });
            });
            a.filters(["years"]);
            a.response_template(OK, &["BottlePage"]);
            a.response("NotFound");
        });
        r.action("show", |a| {
            a.description("Retrieve bottle with given id");
            a.get("/:bottleID");
            a.params(|p| {
                p.attribute_with("bottleID", Primitive::Integer, |b| {
                    b.minimum(1);
                });
            });
            a.views(["default", "tiny"]);
            a.response_template(OK, &["Bottle"]);
            a.response("NotFound");
        });
        r.action("create", |a| {
            a.description("Record new bottle");
            a.post("");
            a.use_trait("Authenticated");
            a.payload(DataType::user_type("BottlePayload"));
            a.response_template("Created", &["/^/accounts/[0-9]+/bottles/[0-9]+$/"]);
        });
        r.action("update", |a| {
            a.patch("/:bottleID");
            a.use_trait("Authenticated");
            a.params(|p| {
                p.attribute("bottleID", Primitive::Integer);
            });
            a.payload(DataType::user_type("BottlePayload"));
            a.response("NoContent");
            a.response("NotFound");
        });
        r.action("rate", |a| {
            a.put("/:bottleID/actions/rate");
            a.params(|p| {
                p.attribute("bottleID", Primitive::Integer);
            });
            a.payload_with(DataType::object(), |p| {
                p.attribute_with("rating", Primitive::Integer, |r| {
                    r.minimum(1).maximum(5);
                });
                p.required(["rating"]);
            });
            a.response("NoContent");
            a.response("NotFound");
        });
        r.action("delete", |a| {
            a.delete("/:bottleID");
            a.use_trait("Authenticated");
            a.params(|p| {
                p.attribute("bottleID", Primitive::Integer);
            });
            a.response("NoContent");
            a.response("NotFound");
        });
    });

    design.resource("health", |r| {
        r.base_path("//health");
        r.action("check", |a| {
            a.description("Perform health check");
            a.get("");
            a.response_with(OK, |r| {
                r.description("The service is up");
            });
        });
    });

    design
}

#[cfg(test)]
mod tests {
    use super::*;
    use blueprint_define::load::bind_action;
    use blueprint_define::render::render;
    use blueprint_types::memory::MemoryRequest;
    use blueprint_types::{FieldError, Kind};

    fn make_api() -> ApiDefinition {
        define_cellar_design().run().unwrap()
    }

    #[test]
    fn design_is_valid() {
        let api = make_api();
        assert_eq!(api.name, "cellar");
        assert_eq!(api.title.as_deref(), Some("The virtual wine cellar"));
        assert_eq!(api.resources.len(), 3);
        assert_eq!(api.media_types.len(), 3);
        assert_eq!(api.user_types.len(), 1);
    }

    #[test]
    fn bottles_nest_under_accounts() {
        let api = make_api();
        let bottle = &api.resources["bottle"];
        let show = &bottle.actions["show"];
        assert_eq!(
            api.full_path(bottle, &show.routes[0]),
            "/accounts/:accountID/bottles/:bottleID"
        );
        assert_eq!(
            api.canonical_path(bottle).as_deref(),
            Some("/accounts/:accountID/bottles/:bottleID")
        );
    }

    #[test]
    fn account_id_is_typed_by_base_params() {
        let api = make_api();
        let list = &api.resources["bottle"].actions["list"];
        let account_id = list.param("accountID").unwrap();
        assert_eq!(account_id.data_type, DataType::Primitive(Primitive::Integer));
    }

    #[test]
    fn responses_are_merged() {
        let api = make_api();
        let show = &api.resources["bottle"].actions["show"];
        let not_found = &show.responses["NotFound"];
        assert_eq!(not_found.status, Some(404));
        assert_eq!(not_found.description.as_deref(), Some("Resource not found"));
        assert_eq!(show.responses[OK].media_type.as_deref(), Some("Bottle"));

        let create = &api.resources["bottle"].actions["create"];
        assert_eq!(create.responses["Created"].status, Some(201));
        assert_eq!(create.responses["Unauthorized"].status, Some(401));
        assert!(create.responses["Created"].headers.contains_key("Location"));
    }

    #[test]
    fn authenticated_actions_require_authorization() {
        let api = make_api();
        let delete = &api.resources["bottle"].actions["delete"];
        assert_eq!(delete.required_headers(), vec!["Authorization"]);
        assert!(api.resources["bottle"].actions["rate"].required_headers().is_empty());
    }

    #[test]
    fn bottle_inherits_payload_members() {
        let api = make_api();
        let bottle = &api.media_types["Bottle"];
        for member in ["name", "vintage", "color", "review"] {
            assert!(bottle.attribute.member(member).is_some(), "missing {member}");
        }
    }

    #[test]
    fn binds_show_request() {
        let api = make_api();
        let bottle = &api.resources["bottle"];
        let show = &bottle.actions["show"];
        let req = MemoryRequest::new()
            .with_param("accountID", "1")
            .with_param("bottleID", "42");
        let bound = bind_action(&api, bottle, show, &req).unwrap();
        assert_eq!(bound.params["bottleID"], Value::Int(42));
        assert_eq!(bound.params["accountID"], Value::Int(1));

        let req = MemoryRequest::new()
            .with_param("accountID", "1")
            .with_param("bottleID", "abc");
        let errors = bind_action(&api, bottle, show, &req).unwrap_err();
        let err = errors.field("bottleID").unwrap();
        assert!(matches!(err, FieldError::InvalidParam { .. }));
        assert_eq!(err.expected_kind(), Some(Kind::Integer));
    }

    #[test]
    fn renders_bottle_views() {
        let api = make_api();
        let bottle = Value::object([
            ("id", Value::from(1)),
            ("href", Value::from("/accounts/1/bottles/1")),
            ("name", Value::from("Number 8")),
            ("vintage", Value::from(2012)),
            ("color", Value::from("red")),
            (
                "account",
                Value::object([
                    ("id", Value::from(1)),
                    ("href", Value::from("/accounts/1")),
                    ("name", Value::from("cellar")),
                ]),
            ),
        ]);
        let mt = &api.media_types["Bottle"];
        assert!(render(&api, mt, &bottle, None).unwrap_err().is_view_required());

        let tiny = render(&api, mt, &bottle, Some("tiny")).unwrap();
        assert_eq!(
            tiny.as_object().map(|o| o.keys().cloned().collect::<Vec<_>>()),
            Some(vec!["href".to_string(), "id".to_string(), "name".to_string()])
        );

        let full = render(&api, mt, &bottle, Some("default")).unwrap();
        let link = Value::object([("href", Value::from("/accounts/1")), ("id", Value::from(1))]);
        assert_eq!(full.get("links").and_then(|l| l.get("account")), Some(&link));
        assert_eq!(
            full.get("account").and_then(|a| a.get("name")),
            Some(&Value::from("cellar"))
        );
    }

    #[test]
    fn design_serializes_to_json() {
        let api = make_api();
        let json = serde_json::to_value(&api).unwrap();
        assert_eq!(json["name"], "cellar");
        assert_eq!(json["base_path"], "/:accountID");
    }
}
