use knowyou::invitations::{
    AccessProduct, ChannelRequirement, ChannelRuleParams, Product, ValidationField,
    compute_send_plan, describe_channels_in, is_pwa_only, validate,
};

#[test]
fn every_input_is_either_sendable_or_explained() {
    for params in ChannelRuleParams::all() {
        let plan = compute_send_plan(params);
        let errors = validate(params);

        if plan.can_proceed {
            assert!(plan.blocking_reason.is_none(), "{params:?}");
            assert!(errors.is_empty(), "{params:?}");
            assert!(
                plan.email.is_required() || plan.whatsapp.is_required(),
                "no mandatory channel for {params:?}"
            );
        } else {
            assert!(plan.blocking_reason.is_some(), "{params:?}");
            assert_eq!(errors.len(), 1, "{params:?}");
        }
    }
}

#[test]
fn app_access_always_needs_whatsapp() {
    for params in ChannelRuleParams::all().filter(|p| p.has_app_access) {
        let plan = compute_send_plan(params);
        if !params.has_phone {
            assert!(!plan.can_proceed);
            assert_eq!(validate(params)[0].field, ValidationField::Phone);
            continue;
        }
        assert!(plan.whatsapp.is_required());
        assert!(plan.whatsapp.products.contains(&Product::App));
        assert!(!plan.email.products.contains(&Product::App));
    }
}

#[test]
fn platform_invitation_with_phone_gets_courtesy_whatsapp() {
    let plan = compute_send_plan(ChannelRuleParams::new(false, true, true));
    assert_eq!(plan.email.requirement, ChannelRequirement::Required);
    assert_eq!(plan.whatsapp.requirement, ChannelRequirement::Informative);
    assert_eq!(plan.whatsapp.products, vec![Product::PlatformInfo]);
}

#[test]
fn nothing_selected_points_at_access_field() {
    let errors = validate(ChannelRuleParams::new(false, false, true));
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].field, ValidationField::Access);
}

#[test]
fn pwa_only_detection_from_form_value() {
    assert_eq!(AccessProduct::parse(" App "), Some(AccessProduct::App));
    assert!(is_pwa_only(AccessProduct::parse("app").unwrap()));
    assert!(!is_pwa_only(AccessProduct::parse("both").unwrap()));
    assert_eq!(AccessProduct::parse("desktop"), None);
}

#[test]
fn summaries_render_in_both_locales() {
    let both = ChannelRuleParams::new(true, true, true);
    let english = describe_channels_in(both, "en");
    assert!(english.starts_with("Email (required): platform access"));
    assert!(english.contains(" + WhatsApp (required): app access, platform info"));

    let blocked = describe_channels_in(ChannelRuleParams::new(true, false, false), "pt-BR");
    assert!(blocked.starts_with("⚠️"));
    assert_ne!(blocked, describe_channels_in(ChannelRuleParams::new(true, false, false), "en"));
}
