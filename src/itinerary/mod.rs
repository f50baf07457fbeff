//! Immutable snapshot of one trip's country → city → place tree.
//!
//! Every mutation builds a new [`Itinerary`] and leaves the receiver alone.
//! `None` means the request was ignored (bad index, duplicate, empty name)
//! and the caller keeps the snapshot it already has, so "did anything change"
//! is answered by [`Itinerary::same_snapshot`].

use crate::models::{is_known_country, City, Country, Document, Place, TripDocument};
use crate::reorder::ListItem;
use std::sync::Arc;

#[derive(Clone, Debug, Default)]
pub struct Itinerary(Arc<Vec<Country>>);

impl PartialEq for Itinerary {
    fn eq(&self, other: &Self) -> bool {
        self.same_snapshot(other) || self.0 == other.0
    }
}

impl Itinerary {
    pub fn new(countries: Vec<Country>) -> Self {
        Self(Arc::new(countries))
    }

    pub fn countries(&self) -> &[Country] {
        &self.0
    }

    pub fn same_snapshot(&self, other: &Itinerary) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub fn to_document(&self, name: &str, description: &str) -> TripDocument {
        TripDocument {
            name: name.to_string(),
            description: description.to_string(),
            countries: self.0.to_vec(),
        }
    }

    fn with_countries(&self, f: impl FnOnce(&mut Vec<Country>) -> bool) -> Option<Itinerary> {
        let mut next = self.0.to_vec();
        f(&mut next).then(|| Itinerary::new(next))
    }

    fn with_country(
        &self,
        country: usize,
        f: impl FnOnce(&mut Country) -> bool,
    ) -> Option<Itinerary> {
        self.with_countries(|xs| xs.get_mut(country).is_some_and(f))
    }

    fn with_city(
        &self,
        country: usize,
        city: usize,
        f: impl FnOnce(&mut City) -> bool,
    ) -> Option<Itinerary> {
        self.with_country(country, |c| c.cities.get_mut(city).is_some_and(f))
    }

    // Countries

    pub fn select_country(&self, name: &str) -> Option<Itinerary> {
        let name = name.trim();
        if name.is_empty() || !is_known_country(name) {
            return None;
        }
        if self.0.iter().any(|c| c.name == name) {
            return None;
        }
        self.with_countries(|xs| {
            xs.push(Country::new(name));
            true
        })
    }

    pub fn delete_country(&self, index: usize) -> Option<Itinerary> {
        self.with_countries(|xs| remove_at(xs, index))
    }

    /// Accept a reordered country sequence verbatim.
    pub fn reorder_countries(&self, countries: Vec<Country>) -> Option<Itinerary> {
        Some(Itinerary::new(countries))
    }

    // Cities

    pub fn add_city(&self, country: usize, name: &str) -> Option<Itinerary> {
        let name = non_empty(name)?;
        self.with_country(country, |c| {
            c.cities.push(City::new(name));
            true
        })
    }

    pub fn delete_city(&self, country: usize, city: usize) -> Option<Itinerary> {
        self.with_country(country, |c| remove_at(&mut c.cities, city))
    }

    pub fn reorder_cities(&self, country: usize, cities: Vec<City>) -> Option<Itinerary> {
        self.with_country(country, |c| {
            c.cities = cities;
            true
        })
    }

    // Places

    pub fn add_place(&self, country: usize, city: usize, name: &str) -> Option<Itinerary> {
        let name = non_empty(name)?;
        self.with_city(country, city, |c| {
            c.places.push(Place::new(name));
            true
        })
    }

    pub fn delete_place(&self, country: usize, city: usize, place: usize) -> Option<Itinerary> {
        self.with_city(country, city, |c| remove_at(&mut c.places, place))
    }

    pub fn reorder_places(&self, country: usize, city: usize, places: Vec<Place>) -> Option<Itinerary> {
        self.with_city(country, city, |c| {
            c.places = places;
            true
        })
    }

    // Documents

    pub fn attach_document(&self, country: usize, city: usize, doc: Document) -> Option<Itinerary> {
        self.with_city(country, city, |c| {
            c.documents.push(doc);
            true
        })
    }

    pub fn remove_document(&self, country: usize, city: usize, document: usize) -> Option<Itinerary> {
        self.with_city(country, city, |c| remove_at(&mut c.documents, document))
    }

    pub fn city(&self, country: usize, city: usize) -> Option<&City> {
        self.0.get(country)?.cities.get(city)
    }

    pub fn document(&self, country: usize, city: usize, document: usize) -> Option<&Document> {
        self.city(country, city)?.documents.get(document)
    }

    pub fn locate_country(&self, country_id: &str) -> Option<usize> {
        self.0.iter().position(|c| c.id == country_id)
    }

    /// Current (country, city) position of a city.
    pub fn locate_city(&self, city_id: &str) -> Option<(usize, usize)> {
        self.0.iter().enumerate().find_map(|(ci, c)| {
            c.cities
                .iter()
                .position(|x| x.id == city_id)
                .map(|i| (ci, i))
        })
    }

    /// Current (country, city, document) position of a document.
    pub fn locate_document(&self, city_id: &str, document_id: &str) -> Option<(usize, usize, usize)> {
        let (country, city) = self.locate_city(city_id)?;
        let d = self
            .city(country, city)?
            .documents
            .iter()
            .position(|d| d.id == document_id)?;
        Some((country, city, d))
    }
}

fn non_empty(name: &str) -> Option<&str> {
    let name = name.trim();
    (!name.is_empty()).then_some(name)
}

fn remove_at<T>(xs: &mut Vec<T>, index: usize) -> bool {
    if index < xs.len() {
        xs.remove(index);
        true
    } else {
        false
    }
}

impl ListItem for Country {
    fn item_id(&self) -> Option<&str> {
        Some(&self.id)
    }
}

impl ListItem for City {
    fn item_id(&self) -> Option<&str> {
        Some(&self.id)
    }
}

impl ListItem for Place {
    fn item_id(&self) -> Option<&str> {
        Some(&self.id)
    }
}
