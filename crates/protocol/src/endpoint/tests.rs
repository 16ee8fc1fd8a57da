use super::*;

fn origin() -> GatewayOrigin {
	GatewayOrigin::secure("gateway.example:8443")
}

#[test]
fn resume_mode_uses_bridge_id_only() {
	let mut params = ConnectionParameters::resume("abc");
	params.username = "root".to_string();
	params.hostname = "ignored.example".to_string();
	params.authentication_method = Some(AuthenticationMethod::Unsupported("otp".to_string()));
	params.command = Some("reboot".to_string());

	let endpoint = resolve(&origin(), &params).unwrap();

	assert_eq!(endpoint.mode(), SessionMode::Resume);
	assert_eq!(endpoint.url().scheme(), "wss");
	assert_eq!(endpoint.path(), "/websocket");
	assert_eq!(endpoint.query(), Some("id=abc"));
	assert_eq!(endpoint.as_str(), "wss://gateway.example:8443/websocket?id=abc");
}

#[test]
fn empty_bridge_id_starts_new_session() {
	let mut params = ConnectionParameters::new_session("u", "h", 22).with_password("p");
	params.bridge_id = Some(String::new());

	let endpoint = resolve(&origin(), &params).unwrap();

	assert_eq!(endpoint.mode(), SessionMode::NewSession);
	assert_eq!(endpoint.path(), "/ssh/connect");
	assert_eq!(endpoint.query(), Some("username=u&hostname=h&password=p&port=22"));
}

#[test]
fn scheme_follows_context_security() {
	let params = ConnectionParameters::resume("abc");
	let insecure = resolve(&GatewayOrigin::insecure("127.0.0.1:5000"), &params).unwrap();
	assert_eq!(insecure.as_str(), "ws://127.0.0.1:5000/websocket?id=abc");

	assert_eq!(Scheme::for_secure_context(true), Scheme::Wss);
	assert_eq!(Scheme::for_secure_context(false), Scheme::Ws);
}

#[test]
fn password_mode_query_order() {
	let params = ConnectionParameters::new_session("u", "h", 22)
		.with_password("p")
		.with_command("");

	let endpoint = resolve(&origin(), &params).unwrap();

	assert_eq!(endpoint.mode(), SessionMode::NewSession);
	assert_eq!(endpoint.path(), "/ssh/connect");
	assert_eq!(endpoint.query(), Some("username=u&hostname=h&password=p&port=22"));
}

#[test]
fn private_key_mode_with_passphrase() {
	let params = ConnectionParameters::new_session("u", "h", 2222)
		.with_private_key("-----BEGIN KEY-----\nAAA+/=\n", Some("s3cret pass".to_string()));

	let endpoint = resolve(&origin(), &params).unwrap();
	let query = endpoint.query().unwrap();

	assert_eq!(
		query,
		"username=u&hostname=h\
		 &private_key=-----BEGIN%20KEY-----%0AAAA%2B%2F%3D%0A\
		 &key_passphrase=s3cret%20pass&port=2222"
	);
	assert!(!query.contains("password="));
}

#[test]
fn private_key_mode_without_passphrase_omits_it() {
	let params = ConnectionParameters::new_session("u", "h", 22).with_private_key("KEY", None);

	let endpoint = resolve(&origin(), &params).unwrap();

	assert_eq!(endpoint.query(), Some("username=u&hostname=h&private_key=KEY&port=22"));
}

#[test]
fn empty_passphrase_is_still_emitted() {
	let params = ConnectionParameters::new_session("u", "h", 22).with_private_key("KEY", Some(String::new()));

	let endpoint = resolve(&origin(), &params).unwrap();

	assert_eq!(
		endpoint.query(),
		Some("username=u&hostname=h&private_key=KEY&key_passphrase=&port=22")
	);
}

#[test]
fn command_is_appended_last() {
	let params = ConnectionParameters::new_session("u", "h", 22)
		.with_password("p")
		.with_command("tail -f /var/log/syslog");

	let endpoint = resolve(&origin(), &params).unwrap();

	assert_eq!(
		endpoint.query(),
		Some("username=u&hostname=h&password=p&port=22&run=tail%20-f%20%2Fvar%2Flog%2Fsyslog")
	);
}

#[test]
fn structural_characters_are_encoded() {
	let params = ConnectionParameters::new_session("a&b=c", "h#frag", 22).with_password("p&port=1?x");

	let endpoint = resolve(&origin(), &params).unwrap();
	let pairs: Vec<(String, String)> = endpoint
		.url()
		.query_pairs()
		.map(|(k, v)| (k.into_owned(), v.into_owned()))
		.collect();

	assert_eq!(
		pairs,
		vec![
			("username".to_string(), "a&b=c".to_string()),
			("hostname".to_string(), "h#frag".to_string()),
			("password".to_string(), "p&port=1?x".to_string()),
			("port".to_string(), "22".to_string()),
		]
	);
	assert_eq!(endpoint.url().fragment(), None);
}

#[test]
fn unsupported_method_fails() {
	let params = ConnectionParameters::new_session("u", "h", 22).with_method("otp");

	let err = resolve(&origin(), &params).unwrap_err();

	assert_eq!(err, ResolveError::UnsupportedAuthenticationMethod("otp".to_string()));
}

#[test]
fn missing_method_fails() {
	let params = ConnectionParameters::new_session("u", "h", 22);

	assert_eq!(
		resolve(&origin(), &params).unwrap_err(),
		ResolveError::MissingAuthenticationMethod
	);
}

#[test]
fn missing_credentials_fail() {
	let params = ConnectionParameters::new_session("u", "h", 22).with_method("password");
	assert_eq!(
		resolve(&origin(), &params).unwrap_err(),
		ResolveError::MissingCredential("password")
	);

	let params = ConnectionParameters::new_session("u", "h", 22).with_method("private_key");
	assert_eq!(
		resolve(&origin(), &params).unwrap_err(),
		ResolveError::MissingCredential("private_key")
	);
}

#[test]
fn invalid_origin_is_rejected() {
	let params = ConnectionParameters::resume("abc");

	for authority in ["", "host/path", "user@host", "host name"] {
		let err = resolve(&GatewayOrigin::insecure(authority), &params).unwrap_err();
		assert!(
			matches!(err, ResolveError::InvalidOrigin(_)),
			"expected InvalidOrigin for {authority:?}, got {err:?}"
		);
	}
}

#[test]
fn redacted_masks_credentials() {
	let params = ConnectionParameters::new_session("u", "h", 22).with_private_key("KEY", Some("pp".to_string()));

	let endpoint = resolve(&origin(), &params).unwrap();
	let redacted = endpoint.redacted();

	assert!(!redacted.contains("KEY"));
	assert!(!redacted.contains("pp"));
	assert!(redacted.contains("username=u"));
}
